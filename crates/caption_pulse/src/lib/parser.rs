//! # Caption Parser
//!
//! Reduces raw caption files (WebVTT, SRT and friends as written by yt-dlp) to
//! the plain spoken text. This is a line filter, not a format parser: cue
//! indices, timing lines, header lines and blank lines are dropped and every
//! other line is kept verbatim, so styled or malformed cue text passes through.

use std::ops::Deref;

use itertools::Itertools;

const TIMING_ARROW: &str = "-->";
const HEADER_KEYWORDS: [&str; 3] = ["WEBVTT", "Kind:", "Language:"];

/// Spoken text of a caption file, one space between cue lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTranscript(String);

impl Deref for NormalizedTranscript {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl NormalizedTranscript {
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Strips structural lines from caption content.
///
/// # Parameters
/// * `raw`: the caption file content.
///
/// # Returns
/// The kept lines, trimmed and joined with single spaces. Empty when nothing
/// but markup survives; callers must treat that as "no captions".
#[tracing::instrument(skip(raw), fields(raw_len = raw.len()))]
pub fn normalize_captions(raw: &str) -> NormalizedTranscript {
    let text = raw
        .lines()
        .map(str::trim)
        .filter(|line| is_spoken_line(line))
        .join(" ");

    NormalizedTranscript(text)
}

fn is_spoken_line(line: &str) -> bool {
    !(line.is_empty()
        || is_cue_index(line)
        || line.contains(TIMING_ARROW)
        || HEADER_KEYWORDS.iter().any(|kw| line.starts_with(kw)))
}

fn is_cue_index(line: &str) -> bool {
    line.bytes().all(|b| b.is_ascii_digit())
}
