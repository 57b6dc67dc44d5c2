use futures::{stream, StreamExt, TryStreamExt};

use crate::{
    chunker::ChunkSequence,
    config::MapReduceConfig,
    error::{Error, SummaryStage},
    llm::{prompts::PromptSet, summarizer::Summarizer},
    types::SummaryStrategy,
};

const SUMMARY_SEPARATOR: &str = "\n\n";

/// Turns a chunk sequence into one summary with the configured strategy.
pub struct Orchestrator<'a, S> {
    summarizer: &'a S,
    prompts: &'a PromptSet,
    config: &'a MapReduceConfig,
}

impl<'a, S: Summarizer> Orchestrator<'a, S> {
    pub fn new(summarizer: &'a S, prompts: &'a PromptSet, config: &'a MapReduceConfig) -> Self {
        Self {
            summarizer,
            prompts,
            config,
        }
    }

    #[tracing::instrument(skip_all, fields(?strategy, chunks = chunks.len(), model = self.summarizer.model_name()))]
    pub async fn summarize(
        &self,
        strategy: SummaryStrategy,
        chunks: &ChunkSequence,
    ) -> Result<String, Error> {
        if chunks.iter().all(|c| c.text.trim().is_empty()) {
            return Err(Error::NoContentToSummarize);
        }

        match strategy {
            SummaryStrategy::MapReduce => self.map_reduce(chunks).await,
            SummaryStrategy::Stuff => self.stuff(chunks).await,
        }
    }

    async fn map_reduce(&self, chunks: &ChunkSequence) -> Result<String, Error> {
        let mut summaries = self.map(chunks).await?;
        tracing::info!(partial_summaries = summaries.len(), "Map stage complete");

        for round in 0..self.config.max_collapse_rounds {
            if summaries.len() <= 1 || joined_len(&summaries) <= self.config.collapse_max_chars {
                break;
            }

            let batches = batch_by_chars(&summaries, self.config.collapse_max_chars);
            tracing::info!(round, batches = batches.len(), "Collapsing partial summaries");
            summaries = self
                .complete_all(
                    SummaryStage::Collapse,
                    batches
                        .iter()
                        .map(|batch| self.prompts.reduce.render(&batch.join(SUMMARY_SEPARATOR))),
                )
                .await?;
        }

        let combined = summaries.join(SUMMARY_SEPARATOR);
        self.complete(SummaryStage::Reduce, self.prompts.reduce.render(&combined))
            .await
    }

    /// Summarizes every non-blank chunk; results keep chunk order.
    async fn map(&self, chunks: &ChunkSequence) -> Result<Vec<String>, Error> {
        let prompts = chunks
            .iter()
            .filter(|chunk| !chunk.text.trim().is_empty())
            .map(|chunk| self.prompts.map.render(&chunk.text));

        self.complete_all(SummaryStage::Map, prompts).await
    }

    async fn stuff(&self, chunks: &ChunkSequence) -> Result<String, Error> {
        let text = chunks.reassemble();
        self.complete(SummaryStage::Stuff, self.prompts.stuff.render(text.trim()))
            .await
    }

    async fn complete_all(
        &self,
        stage: SummaryStage,
        prompts: impl Iterator<Item = String>,
    ) -> Result<Vec<String>, Error> {
        stream::iter(prompts)
            .map(|prompt| self.complete(stage, prompt))
            .buffered(self.config.map_concurrency.max(1))
            .try_collect()
            .await
    }

    async fn complete(&self, stage: SummaryStage, prompt: String) -> Result<String, Error> {
        let response = self
            .summarizer
            .summarize(prompt)
            .await
            .map_err(|e| Error::Summarize {
                stage,
                message: e.to_string(),
            })
            .inspect_err(|e| tracing::error!(error = %e, "Completion failed"))?;

        Ok(response.summary)
    }
}

fn joined_len(summaries: &[String]) -> usize {
    let separators = summaries.len().saturating_sub(1) * SUMMARY_SEPARATOR.len();
    summaries.iter().map(|s| s.chars().count()).sum::<usize>() + separators
}

/// Groups consecutive summaries so that each joined group fits in `limit`
/// characters; a summary longer than `limit` forms its own group.
fn batch_by_chars(summaries: &[String], limit: usize) -> Vec<Vec<&str>> {
    let mut batches: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for summary in summaries {
        let len = summary.chars().count();
        let added = if current.is_empty() {
            len
        } else {
            len + SUMMARY_SEPARATOR.len()
        };

        if !current.is_empty() && current_len + added > limit {
            batches.push(std::mem::take(&mut current));
            current_len = 0;
            current.push(summary);
            current_len += len;
        } else {
            current.push(summary);
            current_len += added;
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
