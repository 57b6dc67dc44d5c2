use tokio_util::sync::CancellationToken;

use crate::{
    config::MapReduceConfig, error::Error, llm::prompts::PromptSet, web::PageLoader,
    yt::CaptionSource, Summarizer, SummaryPipeline,
};

pub struct SummaryPipelineBuilder<C = (), L = (), S = ()> {
    caption_source: C,
    page_loader: L,
    summarizer: S,
    prompts: PromptSet,
    map_reduce: MapReduceConfig,
    cancel: CancellationToken,
}

impl Default for SummaryPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryPipelineBuilder {
    pub fn new() -> Self {
        Self {
            caption_source: (),
            page_loader: (),
            summarizer: (),
            prompts: PromptSet::default(),
            map_reduce: MapReduceConfig::default(),
            cancel: CancellationToken::new(),
        }
    }
}

impl<C, L, S> SummaryPipelineBuilder<C, L, S> {
    pub fn caption_source<C2: CaptionSource>(
        self,
        caption_source: C2,
    ) -> SummaryPipelineBuilder<C2, L, S> {
        SummaryPipelineBuilder {
            caption_source,
            page_loader: self.page_loader,
            summarizer: self.summarizer,
            prompts: self.prompts,
            map_reduce: self.map_reduce,
            cancel: self.cancel,
        }
    }

    pub fn page_loader<L2: PageLoader>(self, page_loader: L2) -> SummaryPipelineBuilder<C, L2, S> {
        SummaryPipelineBuilder {
            caption_source: self.caption_source,
            page_loader,
            summarizer: self.summarizer,
            prompts: self.prompts,
            map_reduce: self.map_reduce,
            cancel: self.cancel,
        }
    }

    pub fn summarizer<S2: Summarizer>(self, summarizer: S2) -> SummaryPipelineBuilder<C, L, S2> {
        SummaryPipelineBuilder {
            caption_source: self.caption_source,
            page_loader: self.page_loader,
            summarizer,
            prompts: self.prompts,
            map_reduce: self.map_reduce,
            cancel: self.cancel,
        }
    }

    pub fn prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn map_reduce(mut self, config: MapReduceConfig) -> Self {
        self.map_reduce = config;
        self
    }

    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl<C, L, S> SummaryPipelineBuilder<C, L, S>
where
    C: CaptionSource,
    L: PageLoader,
    S: Summarizer,
{
    pub fn build(self) -> Result<SummaryPipeline<C, L, S>, Error> {
        self.map_reduce.validate()?;

        Ok(SummaryPipeline {
            caption_source: self.caption_source,
            page_loader: self.page_loader,
            summarizer: self.summarizer,
            prompts: self.prompts,
            map_reduce: self.map_reduce,
            cancel: self.cancel,
        })
    }
}
