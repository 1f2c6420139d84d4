//! Context selection for generation requests
//!
//! Both strategies return an opaque string. Chunk identity does not leave
//! this layer.

use std::sync::Arc;

use rand::Rng;

use crate::error::Result;
use crate::types::Chunk;

use super::store::ChunkStore;

/// Separator between uniformly sampled chunks
pub const SAMPLE_SEPARATOR: &str = "\n\n---\n\n";

/// Separator between semantically retrieved chunks
pub const SEARCH_SEPARATOR: &str = "\n\n";

/// Selects context from the chunk store
#[derive(Clone)]
pub struct RetrievalEngine {
    store: Arc<ChunkStore>,
}

impl RetrievalEngine {
    /// Create an engine over a shared store
    pub fn new(store: Arc<ChunkStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    /// Join `min(n, available)` uniformly sampled chunks. Empty when the store is.
    pub fn sample_context(&self, n: usize) -> String {
        join_chunks(&self.store.sample(n), SAMPLE_SEPARATOR)
    }

    /// [`Self::sample_context`] with a caller-supplied RNG
    pub fn sample_context_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> String {
        join_chunks(&self.store.sample_with(n, rng), SAMPLE_SEPARATOR)
    }

    /// Join the `k` chunks nearest to `query`
    pub async fn semantic_context(&self, query: &str, k: usize) -> Result<String> {
        let chunks = self.store.semantic_search(query, k).await?;
        tracing::debug!("Semantic search returned {} chunks", chunks.len());
        Ok(join_chunks(&chunks, SEARCH_SEPARATOR))
    }
}

fn join_chunks(chunks: &[Chunk], separator: &str) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Cut `text` to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Whether `context` is long enough to generate from
pub fn is_sufficient(context: &str, min_chars: usize) -> bool {
    !context.trim().is_empty() && context.chars().count() >= min_chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_hard_cut() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_is_sufficient() {
        assert!(!is_sufficient("", 50));
        assert!(!is_sufficient(&"x".repeat(49), 50));
        assert!(is_sufficient(&"x".repeat(50), 50));
        assert!(!is_sufficient(&" ".repeat(80), 50));
    }

    #[test]
    fn test_join_chunks_uses_separator() {
        let chunks = vec![Chunk::new("one".into(), 0, 0), Chunk::new("two".into(), 4, 1)];
        assert_eq!(join_chunks(&chunks, SAMPLE_SEPARATOR), "one\n\n---\n\ntwo");
        assert_eq!(join_chunks(&[], SAMPLE_SEPARATOR), "");
    }
}
