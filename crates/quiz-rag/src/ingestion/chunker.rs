//! Fixed-size text chunking with overlap
//!
//! Windows are measured in characters. A window that would cut the text
//! mid-way is pulled back to the last sentence start inside it, or failing
//! that to the last whitespace, as long as the pull-back still leaves more
//! than `overlap` characters so the next window always moves forward.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::Chunk;

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Target chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into ordered, non-empty chunks
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let total = chars.len();
        if total == 0 {
            return Vec::new();
        }

        // Offsets are in chars, slicing is in bytes
        let sentence_starts = self.sentence_starts(text, &chars);

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < total {
            let mut end = (start + self.chunk_size).min(total);

            // Pull the cut back to a sentence start or whitespace
            if end < total {
                end = self.break_point(&chars, &sentence_starts, start, end);
            }

            let byte_start = chars[start].0;
            let byte_end = if end < total { chars[end].0 } else { text.len() };
            let window = &text[byte_start..byte_end];

            let trimmed = window.trim();
            if !trimmed.is_empty() {
                // Position of the first kept char, not the window start
                let leading = window.len() - window.trim_start().len();
                let position = start + window[..leading].chars().count();
                chunks.push(Chunk::new(
                    trimmed.to_string(),
                    position,
                    chunks.len() as u32,
                ));
            }

            if end >= total {
                break;
            }

            // Always advance, even when overlap >= window
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        chunks
    }

    /// Mark the character indices where a sentence begins
    fn sentence_starts(&self, text: &str, chars: &[(usize, char)]) -> Vec<bool> {
        let mut starts = vec![false; chars.len()];
        let mut char_idx = 0usize;

        for (byte_idx, _) in text.split_sentence_bound_indices() {
            while char_idx < chars.len() && chars[char_idx].0 < byte_idx {
                char_idx += 1;
            }
            if char_idx < chars.len() && chars[char_idx].0 == byte_idx {
                starts[char_idx] = true;
            }
        }

        starts
    }

    /// Pick where the window `[start, end)` should stop
    fn break_point(
        &self,
        chars: &[(usize, char)],
        sentence_starts: &[bool],
        start: usize,
        end: usize,
    ) -> usize {
        let floor = start + self.overlap + 1;
        if floor >= end {
            return end;
        }

        if let Some(pos) = (floor..end).rev().find(|&i| sentence_starts[i]) {
            return pos;
        }

        if let Some(pos) = (floor..end).rev().find(|&i| chars[i].1.is_whitespace()) {
            return pos;
        }

        end
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}
