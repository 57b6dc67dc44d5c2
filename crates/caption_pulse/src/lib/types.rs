use std::{fmt, ops::Deref, path::Path};

use url::Url;

use crate::{config::ChunkingConfig, error::Error};

/// Parses `raw` into an absolute `http`/`https` URL with a host.
pub fn parse_source_url(raw: &str) -> Result<Url, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::MissingInput("a URL is required"));
    }

    let invalid = |reason: &str| Error::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("only http and https URLs are supported"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("URL has no host"));
    }

    Ok(url)
}

pub fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host == "youtu.be" || host.ends_with(".youtube.com")
}

/// A validated URL identifying a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference(Url);

impl VideoReference {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        parse_source_url(raw).map(Self)
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn is_youtube(&self) -> bool {
        self.0.host_str().is_some_and(is_youtube_host)
    }
}

impl Deref for VideoReference {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl TryFrom<Url> for VideoReference {
    type Error = Error;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        Self::parse(url.as_str())
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Caption file formats yt-dlp may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptionFormat {
    Vtt,
    Json,
    Srv3,
    Ass,
    Srt,
}

impl CaptionFormat {
    pub const ALL: [CaptionFormat; 5] = [
        CaptionFormat::Vtt,
        CaptionFormat::Json,
        CaptionFormat::Srv3,
        CaptionFormat::Ass,
        CaptionFormat::Srt,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            CaptionFormat::Vtt => "vtt",
            CaptionFormat::Json => "json",
            CaptionFormat::Srv3 => "srv3",
            CaptionFormat::Ass => "ass",
            CaptionFormat::Srt => "srt",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|f| f.extension() == extension)
    }
}

/// Which acquisition path produced the summarized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    VideoCaptions,
    WebPage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryStrategy {
    /// Summarize each chunk, then combine the partial summaries.
    #[default]
    MapReduce,
    /// Put the whole text into a single prompt.
    Stuff,
}

/// Everything one summarization request needs besides the configured collaborators.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub url: String,
    pub chunking: ChunkingConfig,
    pub strategy: SummaryStrategy,
}

impl SummaryRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            chunking: ChunkingConfig::default(),
            strategy: SummaryStrategy::default(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_strategy(mut self, strategy: SummaryStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub source: SourceKind,
    pub chunk_count: usize,
    pub text: String,
}
