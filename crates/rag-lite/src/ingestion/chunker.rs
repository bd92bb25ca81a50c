//! Overlapping fixed-window text chunking with boundary preference

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;

/// Text chunker with configurable size and overlap
///
/// Sizes are counted in characters. Each chunk after the first starts exactly
/// `overlap` characters before the previous one ended, so dropping the first
/// `overlap` characters of every later chunk and concatenating reproduces the
/// input. A chunk ends at the last paragraph boundary inside its window, else
/// the last sentence boundary, else the last word boundary, else it is cut at
/// `chunk_size` characters.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; overlap is clamped below the chunk size
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Create a chunker from config
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split `text` into ordered, overlapping chunks
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            tracing::warn!("Chunker received empty text");
            return Vec::new();
        }

        // offsets[i] is the byte offset of character i; the last entry is text.len()
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;
        let breaks = BreakPoints::scan(text, &offsets);

        tracing::debug!(
            "Chunking text (length: {}), size={}, overlap={}",
            total,
            self.chunk_size,
            self.overlap
        );

        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            if total - start <= self.chunk_size {
                chunks.push(text[offsets[start]..].to_string());
                break;
            }

            let limit = start + self.chunk_size;
            let end = breaks
                .best(start + self.overlap, limit)
                .unwrap_or(limit);

            chunks.push(text[offsets[start]..offsets[end]].to_string());
            start = end - self.overlap;
        }

        tracing::debug!("Created {} chunks", chunks.len());
        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

/// Candidate chunk ends, as sorted character positions, by preference
struct BreakPoints {
    paragraphs: Vec<usize>,
    sentences: Vec<usize>,
    words: Vec<usize>,
}

impl BreakPoints {
    fn scan(text: &str, offsets: &[usize]) -> Self {
        let to_char = |byte: usize| offsets.binary_search(&byte).ok();

        let mut paragraphs = Vec::new();
        let mut sentences = Vec::new();
        let mut newline_run = 0usize;
        for (pos, c) in text.chars().enumerate() {
            match c {
                '\n' => newline_run += 1,
                '\r' => {}
                _ => {
                    if newline_run >= 2 {
                        paragraphs.push(pos);
                    } else if newline_run == 1 {
                        sentences.push(pos);
                    }
                    newline_run = 0;
                }
            }
        }

        sentences.extend(
            text.split_sentence_bound_indices()
                .filter_map(|(byte, _)| to_char(byte))
                .filter(|&pos| pos > 0),
        );
        sentences.sort_unstable();
        sentences.dedup();

        let words = text
            .split_word_bound_indices()
            .filter_map(|(byte, _)| to_char(byte))
            .filter(|&pos| pos > 0)
            .collect();

        Self {
            paragraphs,
            sentences,
            words,
        }
    }

    /// Last break in `(floor, limit]`, trying each preference level in turn
    fn best(&self, floor: usize, limit: usize) -> Option<usize> {
        [&self.paragraphs, &self.sentences, &self.words]
            .into_iter()
            .find_map(|candidates| {
                let idx = candidates.partition_point(|&pos| pos <= limit);
                candidates[..idx].last().copied().filter(|&pos| pos > floor)
            })
    }
}
