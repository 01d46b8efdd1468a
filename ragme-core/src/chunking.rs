//! Document chunking.
//!
//! Provides the [`Chunker`] trait and [`FixedSizeChunker`], a deterministic
//! splitter producing overlapping fixed-size windows of text.

use crate::error::{KbError, Result};

/// A strategy for splitting raw text into chunks.
///
/// Implementations must be deterministic: identical input always yields an
/// identical chunk sequence. Re-ingestion detection and the test suite rely
/// on this.
pub trait Chunker: Send + Sync {
    /// Split text into an ordered sequence of chunk strings.
    ///
    /// Returns an empty `Vec` for empty input.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// Each chunk covers `chunk_size` characters starting `chunk_size -
/// chunk_overlap` characters after the previous one; the final chunk may be
/// shorter. Chunk boundaries are counted in characters, never bytes, so
/// multi-byte UTF-8 content is split safely.
///
/// # Example
///
/// ```rust,ignore
/// use ragme_core::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(512, 50)?;
/// let chunks = chunker.chunk("some long document text");
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if `chunk_size == 0` or
    /// `chunk_overlap >= chunk_size`. An overlap equal to or larger than
    /// the chunk size would make the window stop advancing, so it is
    /// rejected up front.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(KbError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(KbError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += self.chunk_size - self.chunk_overlap;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_shorter_than_chunk_size_yields_one_chunk() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk("short text");
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn text_exactly_chunk_size_yields_one_chunk() {
        let chunker = FixedSizeChunker::new(10, 3).unwrap();
        let text = "abcdefghij";
        assert_eq!(chunker.chunk(text), vec![text.to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn hundred_chars_size_30_overlap_5_yields_four_chunks() {
        let chunker = FixedSizeChunker::new(30, 5).unwrap();
        let text = "A".repeat(100);
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].len(), 30);
        assert_eq!(chunks[1].len(), 30);
        assert_eq!(chunks[2].len(), 30);
        assert!(chunks[3].len() < 30);
    }

    #[test]
    fn consecutive_chunks_share_the_overlap_region() {
        let chunker = FixedSizeChunker::new(20, 6).unwrap();
        let text: String = ('a'..='z').cycle().take(95).collect();
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail = &prev[prev.len() - 6..];
            let head = &next[..6.min(next.len())];
            assert_eq!(&tail[..head.len()], head);
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        let chunker = FixedSizeChunker::new(37, 11).unwrap();
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(10);
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn multibyte_text_is_split_on_character_boundaries() {
        let chunker = FixedSizeChunker::new(4, 1).unwrap();
        let text = "日本語のテキストです";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks[0].chars().count(), 4);
        let total: String = chunks.concat();
        assert!(total.starts_with("日本語の"));
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(FixedSizeChunker::new(0, 0).is_err());
        assert!(FixedSizeChunker::new(10, 10).is_err());
        assert!(FixedSizeChunker::new(10, 15).is_err());
    }
}
