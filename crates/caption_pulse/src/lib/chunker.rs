//! Recursive character splitting into overlapping, bounded chunks.
//!
//! Chunks are exact substrings of the input: separators stay attached to the
//! start of the piece that follows them, and nothing is trimmed. Consecutive
//! chunks either touch or overlap, so the input can always be reassembled.

use std::{
    collections::VecDeque,
    ops::{Deref, Range},
};

use crate::{
    config::{ChunkingConfig, Separator},
    error::Error,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the sequence.
    pub index: usize,
    /// Byte offset of the chunk in the source text.
    pub offset: usize,
    pub text: String,
}

impl Chunk {
    /// Byte offset one past the end of the chunk in the source text.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Chunks in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSequence(Vec<Chunk>);

impl Deref for ChunkSequence {
    type Target = [Chunk];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ChunkSequence {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl ChunkSequence {
    /// Text `chunk` shares with the chunk before it.
    pub fn overlap_with_previous(&self, index: usize) -> &str {
        let previous = index.checked_sub(1).and_then(|i| self.0.get(i));
        let (Some(chunk), Some(previous)) = (self.0.get(index), previous) else {
            return "";
        };
        let shared = previous.end().saturating_sub(chunk.offset);
        &chunk.text[..shared.min(chunk.text.len())]
    }

    /// Concatenates the chunks with the overlapping prefixes removed.
    pub fn reassemble(&self) -> String {
        let mut text = String::new();
        let mut covered = 0usize;
        for chunk in &self.0 {
            let skip = covered.saturating_sub(chunk.offset).min(chunk.text.len());
            text.push_str(&chunk.text[skip..]);
            covered = covered.max(chunk.end());
        }
        text
    }
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: ChunkingConfig,
}

impl TextSplitter {
    pub fn new(config: ChunkingConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub fn split(&self, text: &str) -> ChunkSequence {
        if text.is_empty() {
            return ChunkSequence::default();
        }

        let mut spans = Vec::new();
        self.split_span(text, 0..text.len(), &self.config.separators, &mut spans);

        let chunks = spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| Chunk {
                index,
                offset: span.start,
                text: text[span].to_string(),
            })
            .collect::<Vec<_>>();

        tracing::debug!(chunks = chunks.len(), "Split text into chunks");
        ChunkSequence(chunks)
    }

    fn split_span(
        &self,
        text: &str,
        span: Range<usize>,
        separators: &[Separator],
        out: &mut Vec<Range<usize>>,
    ) {
        let piece = &text[span.clone()];

        // character splitting is the implicit last resort
        let (separator, remaining) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| piece.contains(sep.as_str()))
            .map(|(i, sep)| (*sep, &separators[i + 1..]))
            .unwrap_or((Separator::Character, &[]));

        let mut fitting = Vec::new();
        for part in split_keeping_separator(text, span, separator) {
            if char_len(&text[part.clone()]) <= self.config.max_chunk_size {
                fitting.push(part);
                continue;
            }

            if !fitting.is_empty() {
                self.merge(text, &fitting, out);
                fitting.clear();
            }
            self.split_span(text, part, remaining, out);
        }

        if !fitting.is_empty() {
            self.merge(text, &fitting, out);
        }
    }

    /// Greedily packs contiguous parts into chunks, carrying at most
    /// `chunk_overlap` characters of trailing parts into the next chunk.
    fn merge(&self, text: &str, parts: &[Range<usize>], out: &mut Vec<Range<usize>>) {
        let max = self.config.max_chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
        let mut total = 0;

        for part in parts {
            let len = char_len(&text[part.clone()]);

            if total + len > max {
                if let Some(span) = window_span(&window) {
                    out.push(span);
                }
                while total > overlap || (total + len > max && total > 0) {
                    let Some((_, front_len)) = window.pop_front() else {
                        break;
                    };
                    total -= front_len;
                }
            }

            window.push_back((part.clone(), len));
            total += len;
        }

        if let Some(span) = window_span(&window) {
            out.push(span);
        }
    }
}

fn window_span(window: &VecDeque<(Range<usize>, usize)>) -> Option<Range<usize>> {
    let (first, _) = window.front()?;
    let (last, _) = window.back()?;
    Some(first.start..last.end)
}

/// Splits `span` of `text` at every occurrence of `separator`, keeping the
/// separator at the start of the following part. Empty parts are dropped.
fn split_keeping_separator(
    text: &str,
    span: Range<usize>,
    separator: Separator,
) -> Vec<Range<usize>> {
    let piece = &text[span.clone()];
    let base = span.start;

    let boundaries: Vec<usize> = match separator {
        Separator::Character => piece.char_indices().map(|(i, _)| i).collect(),
        sep => std::iter::once(0)
            .chain(piece.match_indices(sep.as_str()).map(|(i, _)| i))
            .collect(),
    };

    let mut parts = Vec::with_capacity(boundaries.len());
    for (i, &start) in boundaries.iter().enumerate() {
        let end = boundaries.get(i + 1).copied().unwrap_or(piece.len());
        if start < end {
            parts.push(base + start..base + end);
        }
    }
    parts
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn splitter(max: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(ChunkingConfig::new(max, overlap)).expect("valid config")
    }

    fn assert_invariants(text: &str, chunks: &ChunkSequence, max: usize, overlap: usize) {
        assert_eq!(chunks.reassemble(), text, "reassembly must be lossless");

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(&text[chunk.offset..chunk.end()], chunk.text);
            assert!(
                chunk.char_len() <= max,
                "chunk {i} has {} chars, max is {max}",
                chunk.char_len()
            );

            if i == 0 {
                assert_eq!(chunk.offset, 0);
                continue;
            }
            let previous = &chunks[i - 1];
            assert!(chunk.offset > previous.offset, "chunks must advance");
            assert!(chunk.offset <= previous.end(), "chunks must not leave gaps");

            let shared = chunks.overlap_with_previous(i);
            assert!(previous.text.ends_with(shared));
            assert!(chunk.text.starts_with(shared));
            assert!(shared.chars().count() <= overlap);
        }
    }

    #[test]
    fn test_uniform_text_splits_into_two_chunks() {
        let text = "A".repeat(5000);
        let chunks = splitter(3000, 300).split(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].char_len(), 3000);
        assert!(chunks[1].text.starts_with(&chunks[0].text[2700..]));
        assert_eq!(chunks.overlap_with_previous(1).len(), 300);
        assert_invariants(&text, &chunks, 3000, 300);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(splitter(100, 10).split("").is_empty());
    }

    #[test]
    fn test_short_text_is_a_single_chunk() {
        let chunks = splitter(100, 10).split("Hello world. This is a test.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world. This is a test.");
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let text = "first paragraph here\n\nsecond paragraph here\n\nthird one";
        let chunks = splitter(25, 0).split(text);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "first paragraph here",
                "\n\nsecond paragraph here",
                "\n\nthird one"
            ]
        );
        assert_invariants(text, &chunks, 25, 0);
    }

    #[test]
    fn test_falls_back_to_words_inside_long_paragraph() {
        let text = "short\n\none two three four five six seven eight nine ten";
        let chunks = splitter(20, 5).split(text);

        assert_eq!(chunks[0].text, "short");
        assert!(chunks.iter().skip(1).all(|c| c.char_len() <= 20));
        assert_invariants(text, &chunks, 20, 5);
    }

    #[test]
    fn test_word_chunks_overlap() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = splitter(20, 10).split(text);

        assert!(chunks.len() > 1);
        assert!(
            (1..chunks.len()).any(|i| !chunks.overlap_with_previous(i).is_empty()),
            "expected some shared context between word chunks"
        );
        assert_invariants(text, &chunks, 20, 10);
    }

    #[test]
    fn test_reassemble_removes_overlapping_prefixes() {
        let text = "aaaa bbbb cccc dddd";
        let chunks = splitter(10, 5).split(text);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["aaaa bbbb", " bbbb cccc", " cccc dddd"]);
        assert_eq!(chunks.overlap_with_previous(1), " bbbb");
        assert_eq!(chunks.reassemble(), text);
    }

    #[test]
    fn test_multibyte_text_is_split_on_char_boundaries() {
        let text = "日本語のテキスト".repeat(50);
        let chunks = splitter(64, 8).split(&text);
        assert!(chunks.len() > 1);
        assert_invariants(&text, &chunks, 64, 8);
    }

    #[test]
    fn test_order_matches_document_order() {
        let text = (0..200)
            .map(|i| format!("sentence {i}."))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = splitter(120, 20).split(&text);
        let offsets: Vec<usize> = chunks.iter().map(|c| c.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn test_separator_list_without_character_still_bounds_chunks() {
        let config = ChunkingConfig {
            max_chunk_size: 10,
            chunk_overlap: 2,
            separators: vec![Separator::Word],
        };
        let text = "tiny supercalifragilisticexpialidocious word";
        let chunks = TextSplitter::new(config).unwrap().split(text);
        assert_invariants(text, &chunks, 10, 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(TextSplitter::new(ChunkingConfig::new(100, 100)).is_err());
    }

    proptest! {
        #[test]
        fn prop_chunks_are_bounded_contiguous_and_lossless(
            text in "[a-z \n]{0,400}",
            max in 1usize..60,
            overlap_ratio in 0usize..100,
        ) {
            let overlap = (max - 1) * overlap_ratio / 100;
            let chunks = splitter(max, overlap).split(&text);
            prop_assert_eq!(chunks.is_empty(), text.is_empty());
            assert_invariants(&text, &chunks, max, overlap);
        }

        #[test]
        fn prop_unicode_text_is_lossless(text in "\\PC{0,200}", max in 2usize..40) {
            let chunks = splitter(max, max / 3).split(&text);
            assert_invariants(&text, &chunks, max, max / 3);
        }
    }
}
