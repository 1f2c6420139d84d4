//! Provider abstractions for the external collaborators
//!
//! The pipeline only sees two narrow contracts, `embed(text) -> vector` and
//! `complete(prompt) -> text`. Backends are picked by `llm.provider`.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
