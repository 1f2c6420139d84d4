//! Chunk type: the unit of retrieval

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded, contiguous slice of ingested document text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Chunk text (never empty)
    pub text: String,
    /// Character offset of the chunk start in the source document
    pub source_position: usize,
    /// Index of this chunk within the document
    pub index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: String, source_position: usize, index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            source_position,
            index,
        }
    }

    /// Length of the chunk text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
