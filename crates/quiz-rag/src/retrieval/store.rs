//! Chunk store: the single owner of the current document's chunks
//!
//! The chunk list and its vector index form one [`ChunkSet`]. Ingestion
//! builds a complete new set off to the side and swaps the `Arc` under a
//! short write lock, so readers holding a snapshot never see a mix of two
//! documents.

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::ingestion::TextChunker;
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

use super::index::VectorIndex;

/// One document's chunks together with their embeddings
#[derive(Debug, Default)]
pub struct ChunkSet {
    chunks: Vec<Chunk>,
    index: VectorIndex,
}

impl ChunkSet {
    /// Pair chunks with an index built from their embeddings
    pub fn new(chunks: Vec<Chunk>, index: VectorIndex) -> Self {
        debug_assert_eq!(chunks.len(), index.len());
        Self { chunks, index }
    }

    /// Chunks in document order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Uniform sample without replacement, `n` clamped to the set size
    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Chunk> {
        self.chunks.choose_multiple(rng, n).cloned().collect()
    }

    /// Nearest chunks to an already-embedded query
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Chunk>> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|(i, _)| self.chunks.get(i).cloned())
            .collect())
    }
}

/// Owner of the current chunk set
pub struct ChunkStore {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    current: RwLock<Arc<ChunkSet>>,
}

impl ChunkStore {
    /// Create an empty store
    pub fn new(config: &ChunkingConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            chunker: TextChunker::from_config(config),
            embedder,
            current: RwLock::new(Arc::new(ChunkSet::default())),
        }
    }

    /// Replace the stored document with `text`, returning the chunk count.
    ///
    /// Text that yields no chunks clears the store and returns 0. If embedding
    /// fails the previous chunk set stays in place and the error is returned.
    pub async fn ingest(&self, text: &str) -> Result<usize> {
        // Step 1: split into windows
        let chunks = self.chunker.chunk(text);

        // An unreadable upload replaces the previous document with nothing
        if chunks.is_empty() {
            tracing::warn!("Document produced no chunks; clearing chunk store");
            self.swap(ChunkSet::default());
            return Ok(0);
        }

        // Step 2: embed every chunk; a failure here leaves the old set in place
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let start = std::time::Instant::now();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(crate::error::Error::embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        // Step 3: index, then publish atomically
        let index = VectorIndex::build(embeddings)?;
        let count = chunks.len();

        tracing::info!(
            "Embedded {} chunks ({} dims) in {}ms using {}",
            count,
            index.dimensions(),
            start.elapsed().as_millis(),
            self.embedder.name()
        );

        self.swap(ChunkSet::new(chunks, index));
        Ok(count)
    }

    fn swap(&self, set: ChunkSet) {
        *self.current.write() = Arc::new(set);
    }

    /// Drop the stored document
    pub fn clear(&self) {
        self.swap(ChunkSet::default());
    }

    /// Current chunk set. Later ingests do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<ChunkSet> {
        Arc::clone(&self.current.read())
    }

    /// All chunks in document order
    pub fn all_chunks(&self) -> Vec<Chunk> {
        self.snapshot().chunks().to_vec()
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Uniform sample without replacement
    pub fn sample(&self, n: usize) -> Vec<Chunk> {
        self.sample_with(n, &mut rand::thread_rng())
    }

    /// Uniform sample with a caller-supplied RNG
    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Chunk> {
        self.snapshot().sample_with(n, rng)
    }

    /// Top-k chunks nearest to `query`. An empty store returns nothing
    /// without calling the embedder.
    pub async fn semantic_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        let set = self.snapshot();
        if set.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query).await?;
        set.search(&query_vec, k)
    }

    /// The embedder shared with answer grading
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Letter-frequency embedder
    struct LetterEmbedder {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl LetterEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::embedding("offline"));
            }
            let mut v = vec![0.0f32; 26];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(v)
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "letters"
        }
    }

    fn store(chunk_size: usize, overlap: usize) -> (ChunkStore, Arc<LetterEmbedder>) {
        let embedder = Arc::new(LetterEmbedder::new());
        let config = ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        };
        (ChunkStore::new(&config, embedder.clone()), embedder)
    }

    fn document(paragraphs: &[&str]) -> String {
        paragraphs.join(" ")
    }

    #[tokio::test]
    async fn test_ingest_replaces_previous_document() {
        let (store, _) = store(40, 5);
        let first = store
            .ingest(&document(&["Alpha beta gamma delta.", "Epsilon zeta eta theta."]))
            .await
            .unwrap();
        assert!(first > 0);
        assert_eq!(store.len(), first);

        let second = store.ingest("Only one short line.").await.unwrap();
        assert_eq!(second, 1);
        assert_eq!(store.all_chunks()[0].text, "Only one short line.");
    }

    #[tokio::test]
    async fn test_empty_document_clears_store() {
        let (store, _) = store(40, 5);
        store.ingest("Some content worth keeping around.").await.unwrap();
        assert_eq!(store.ingest("   ").await.unwrap(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_embedding_keeps_old_set() {
        let (store, embedder) = store(40, 5);
        store.ingest("Some content worth keeping around.").await.unwrap();

        embedder.fail.store(true, Ordering::SeqCst);
        let result = store.ingest("A different document entirely.").await;
        assert!(result.is_err());
        assert_eq!(store.all_chunks()[0].text, "Some content worth keeping around.");
    }

    #[tokio::test]
    async fn test_snapshot_survives_swap() {
        let (store, _) = store(40, 5);
        store.ingest("The first document text.").await.unwrap();
        let before = store.snapshot();

        store.ingest("The second document text.").await.unwrap();
        assert_eq!(before.chunks()[0].text, "The first document text.");
        assert_eq!(store.snapshot().chunks()[0].text, "The second document text.");
    }

    #[tokio::test]
    async fn test_sample_is_distinct_and_clamped() {
        let (store, _) = store(30, 5);
        let text = (0..12)
            .map(|i| format!("Fact number {} is here.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let total = store.ingest(&text).await.unwrap();
        assert!(total > 3);

        let mut rng = StdRng::seed_from_u64(7);
        let picked = store.sample_with(3, &mut rng);
        assert_eq!(picked.len(), 3);
        let ids: HashSet<_> = picked.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 3);

        assert_eq!(store.sample(total + 10).len(), total);
    }

    #[tokio::test]
    async fn test_semantic_search_on_empty_store_skips_embedder() {
        let (store, embedder) = store(40, 5);
        let hits = store.semantic_search("anything", 5).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_semantic_search_finds_closest_chunk() {
        let (store, _) = store(30, 0);
        store
            .ingest("zzzz zzzz zzzz zzzz zzzz. aaaa aaaa aaaa aaaa aaaa.")
            .await
            .unwrap();

        let hits = store.semantic_search("aaaa", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].text.starts_with("aaaa"));
    }
}
