mod chunker;
pub mod config;
mod error;
mod llm;
pub mod parser;
mod processor;
pub mod tracing;
pub mod types;
pub mod web;
pub mod yt;

pub use chunker::{Chunk, ChunkSequence, TextSplitter};
pub use error::{Error, ExtractError, SummaryStage};
pub use llm::openai;
pub use llm::{
    map_reduce::Orchestrator,
    prompts::{PromptSet, PromptTemplate},
    summarizer::{Summarizer, SummaryResponse},
};
pub use processor::{builder::SummaryPipelineBuilder, fetch_transcript, SummaryPipeline};
