//! Tunables for the caption, chunking and summarization stages.

use std::{path::PathBuf, time::Duration};

use crate::{error::Error, types::CaptionFormat};

/// Boundary classes the splitter tries, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Paragraph,
    Line,
    Word,
    Character,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Paragraph => "\n\n",
            Separator::Line => "\n",
            Separator::Word => " ",
            Separator::Character => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Upper bound of a chunk, in characters.
    pub max_chunk_size: usize,
    /// Characters shared by consecutive chunks, at most.
    pub chunk_overlap: usize,
    pub separators: Vec<Separator>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 3000,
            chunk_overlap: 300,
            separators: vec![
                Separator::Paragraph,
                Separator::Line,
                Separator::Word,
                Separator::Character,
            ],
        }
    }
}

impl ChunkingConfig {
    pub fn new(max_chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            max_chunk_size,
            chunk_overlap,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_chunk_size == 0 {
            return Err(Error::Config("max_chunk_size must be greater than 0".into()));
        }
        if self.chunk_overlap >= self.max_chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be less than max_chunk_size ({})",
                self.chunk_overlap, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Subtitle language passed to `--sub-langs`.
    pub language: String,
    pub formats: Vec<CaptionFormat>,
    /// File name template, relative to the scoped output directory.
    pub output_template: String,
    /// `None` waits for yt-dlp indefinitely.
    pub timeout: Option<Duration>,
    /// Parent of the scoped output directories; the system temp dir when unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            language: "en".into(),
            formats: CaptionFormat::ALL.to_vec(),
            output_template: "%(title)s.%(ext)s".into(),
            timeout: Some(Duration::from_secs(300)),
            temp_root: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapReduceConfig {
    /// Map-stage completions in flight at once.
    pub map_concurrency: usize,
    /// Joined partial summaries longer than this are collapsed before the final reduce.
    pub collapse_max_chars: usize,
    pub max_collapse_rounds: usize,
}

impl Default for MapReduceConfig {
    fn default() -> Self {
        Self {
            map_concurrency: 4,
            collapse_max_chars: 12_000,
            max_collapse_rounds: 3,
        }
    }
}

impl MapReduceConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.map_concurrency == 0 {
            return Err(Error::Config("map_concurrency must be at least 1".into()));
        }
        if self.collapse_max_chars == 0 {
            return Err(Error::Config("collapse_max_chars must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunking_is_valid() {
        let config = ChunkingConfig::default();
        assert_eq!(config.max_chunk_size, 3000);
        assert_eq!(config.chunk_overlap, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        assert!(matches!(
            ChunkingConfig::new(300, 300).validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ChunkingConfig::new(0, 0).validate(),
            Err(Error::Config(_))
        ));
        assert!(ChunkingConfig::new(10, 9).validate().is_ok());
    }

    #[test]
    fn test_map_reduce_validation() {
        assert!(MapReduceConfig::default().validate().is_ok());
        let config = MapReduceConfig {
            map_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
