//! Chunk storage and context retrieval

mod index;
mod search;
pub mod similarity;
mod store;

pub use index::VectorIndex;
pub use search::{
    is_sufficient, truncate_chars, RetrievalEngine, SAMPLE_SEPARATOR, SEARCH_SEPARATOR,
};
pub use store::{ChunkSet, ChunkStore};
