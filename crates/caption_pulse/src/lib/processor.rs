use tokio_util::sync::CancellationToken;

use crate::{
    chunker::TextSplitter,
    config::MapReduceConfig,
    error::{Error, ExtractError},
    llm::{map_reduce::Orchestrator, prompts::PromptSet, summarizer::Summarizer},
    parser::{normalize_captions, NormalizedTranscript},
    types::{parse_source_url, SourceKind, Summary, SummaryRequest, VideoReference},
    web::PageLoader,
    yt::CaptionSource,
};

pub mod builder;

/// URL in, summary out: captions for YouTube links, page text for everything else.
pub struct SummaryPipeline<C, L, S>
where
    C: CaptionSource,
    L: PageLoader,
    S: Summarizer,
{
    pub(crate) caption_source: C,
    pub(crate) page_loader: L,
    pub(crate) summarizer: S,
    pub(crate) prompts: PromptSet,
    pub(crate) map_reduce: MapReduceConfig,
    pub(crate) cancel: CancellationToken,
}

impl<C, L, S> SummaryPipeline<C, L, S>
where
    C: CaptionSource,
    L: PageLoader,
    S: Summarizer,
{
    /// Token that aborts the running request when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[tracing::instrument(skip(self, request), fields(url = %request.url, strategy = ?request.strategy))]
    pub async fn run(&self, request: SummaryRequest) -> Result<Summary, Error> {
        let splitter = TextSplitter::new(request.chunking)?;
        let url = parse_source_url(&request.url)?;

        let video = VideoReference::try_from(url.clone())?;
        let (source, text) = if video.is_youtube() {
            let transcript = fetch_transcript(&self.caption_source, &video, &self.cancel).await?;
            (SourceKind::VideoCaptions, transcript.into_inner())
        } else {
            (SourceKind::WebPage, self.load_page(&url).await?)
        };

        let chunks = splitter.split(&text);
        if chunks.is_empty() {
            tracing::warn!(?source, "Source produced no text");
            return Err(Error::NoContentToSummarize);
        }
        tracing::info!(?source, chunks = chunks.len(), text_len = text.len(), "Summarizing");

        let orchestrator = Orchestrator::new(&self.summarizer, &self.prompts, &self.map_reduce);
        let text = self
            .cancel
            .run_until_cancelled(orchestrator.summarize(request.strategy, &chunks))
            .await
            .ok_or(Error::Cancelled)??;

        Ok(Summary {
            source,
            chunk_count: chunks.len(),
            text,
        })
    }

    async fn load_page(&self, url: &url::Url) -> Result<String, Error> {
        self.cancel
            .run_until_cancelled(self.page_loader.load_text(url))
            .await
            .ok_or(Error::Cancelled)?
            .map_err(|e| Error::PageLoad(format!("{e:#}")))
            .inspect_err(|e| tracing::error!(error = %e, "Failed to load page"))
    }
}

/// Runs caption extraction and normalization for `video`.
///
/// A caption file that normalizes to nothing is reported as
/// [`ExtractError::NoCaptionsAvailable`].
#[tracing::instrument(skip_all, fields(video = %video))]
pub async fn fetch_transcript<C: CaptionSource>(
    source: &C,
    video: &VideoReference,
    cancel: &CancellationToken,
) -> Result<NormalizedTranscript, Error> {
    let caption_file = source
        .fetch_captions(video, cancel)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch captions"))?;

    let format = caption_file.format();
    let raw = caption_file.read().await?;
    let transcript = normalize_captions(&raw);

    if transcript.is_empty() {
        tracing::warn!(?format, raw_len = raw.len(), "Caption file had no spoken text");
        return Err(ExtractError::NoCaptionsAvailable.into());
    }

    tracing::info!(?format, transcript_len = transcript.len(), "Normalized captions");
    Ok(transcript)
}
