//! Text generation collaborator contract

use async_trait::async_trait;

use crate::error::Result;

/// `complete(prompt) -> text`
///
/// The returned text is untrusted and always goes through the response
/// parsers. Backends: [`super::OllamaLlm`] and [`super::GeminiClient`],
/// picked by `llm.provider`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Whether the backend answers
    async fn health_check(&self) -> Result<bool>;

    /// Backend name for logs
    fn name(&self) -> &str;

    /// Model identifier for logs
    fn model(&self) -> &str;
}
