use std::{fmt, path::PathBuf, time::Duration};

use itertools::Itertools;

/// Failures of the caption acquisition stage.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(
        "yt-dlp executable not found (tried: {}); install yt-dlp or point YTDLP_PATH at it",
        display_paths(attempted)
    )]
    ExecutableNotFound { attempted: Vec<PathBuf> },
    #[error("yt-dlp failed with exit code {}: {stderr}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ExtractionFailed { code: Option<i32>, stderr: String },
    #[error("No captions available: the video has no subtitles in the requested language")]
    NoCaptionsAvailable,
    #[error("yt-dlp did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("Caption extraction was cancelled")]
    Cancelled,
    #[error("IO error during caption extraction: {0}")]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display()).join(", ")
}

/// Pipeline stage a summarization failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStage {
    Map,
    Collapse,
    Reduce,
    Stuff,
}

impl fmt::Display for SummaryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            SummaryStage::Map => "map",
            SummaryStage::Collapse => "collapse",
            SummaryStage::Reduce => "reduce",
            SummaryStage::Stuff => "stuff",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing input: {0}")]
    MissingInput(&'static str),
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("No content to summarize: the source produced no text")]
    NoContentToSummarize,
    #[error("Failed to load web page: {0}")]
    PageLoad(String),
    #[error("Summarization failed in the {stage} stage: {message}")]
    Summarize { stage: SummaryStage, message: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Request was cancelled")]
    Cancelled,
}
