//! Embedding collaborator contract

use async_trait::async_trait;

use crate::error::{Error, Result};

/// `embed(text) -> vector`
///
/// One provider both indexes the document chunks and scores free-text
/// answers, so chunk vectors and answer vectors are always comparable.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed every chunk of a document, in order. Stops at the first
    /// failure and names the chunk that caused it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (idx, text) in texts.iter().enumerate() {
            let vector = self.embed(text).await.map_err(|e| match e {
                Error::Embedding(msg) => {
                    Error::embedding(format!("chunk {} of {}: {}", idx + 1, texts.len(), msg))
                }
                other => other,
            })?;
            vectors.push(vector);
        }
        Ok(vectors)
    }

    /// Whether the backend answers
    async fn health_check(&self) -> Result<bool>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
