//! Application state for the quiz server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{LlmBackend, RagConfig};
use crate::error::Result;
use crate::generation::Orchestrator;
use crate::grading::AnswerChecker;
use crate::providers::{
    EmbeddingProvider, GeminiClient, LlmProvider, OllamaClient, OllamaEmbedder, OllamaLlm,
};
use crate::retrieval::ChunkStore;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Current document's chunks
    store: Arc<ChunkStore>,
    /// Quiz / flashcard / chat pipeline
    orchestrator: Orchestrator,
    /// Free-text answer grading
    checker: AnswerChecker,
    /// Embedding provider (shared by the store and the checker)
    embedding_provider: Arc<dyn EmbeddingProvider>,
    /// Generation backend (Ollama or Gemini)
    llm_provider: Arc<dyn LlmProvider>,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create application state with the providers named in `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing quiz application state (llm: {:?})...",
            config.llm.provider
        );

        let ollama = Arc::new(OllamaClient::new(&config.llm)?);
        tracing::info!(
            "Ollama client initialized at {} (using {} for embeddings)",
            ollama.base_url(),
            config.llm.embed_model
        );

        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OllamaEmbedder::from_client(Arc::clone(&ollama)));

        let llm: Arc<dyn LlmProvider> = match config.llm.provider {
            LlmBackend::Ollama => {
                tracing::info!("Using Ollama for generation ({})", config.llm.generate_model);
                Arc::new(OllamaLlm::from_client(
                    ollama,
                    config.llm.generate_model.clone(),
                ))
            }
            LlmBackend::Gemini => {
                tracing::info!("Using Gemini for generation ({})", config.llm.gemini.model);
                Arc::new(GeminiClient::new(&config.llm)?)
            }
        };

        Ok(Self::with_providers(config, embedder, llm))
    }

    /// Create application state around existing providers
    pub fn with_providers(
        config: RagConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        llm_provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let store = Arc::new(ChunkStore::new(
            &config.chunking,
            Arc::clone(&embedding_provider),
        ));
        let orchestrator = Orchestrator::new(Arc::clone(&store), Arc::clone(&llm_provider), &config);
        let checker = AnswerChecker::new(Arc::clone(&embedding_provider), &config.answer_check);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                orchestrator,
                checker,
                embedding_provider,
                llm_provider,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Configuration the state was built from
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Chunks of the current document
    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.inner.store
    }

    /// Quiz, flashcard and chat pipeline
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    /// Free-text answer grading
    pub fn checker(&self) -> &AnswerChecker {
        &self.inner.checker
    }

    /// Embedding backend (chunk index and answer grading)
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedding_provider
    }

    /// Generation backend
    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm_provider
    }

    /// Readiness flag (collaborator health is checked separately)
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Flip the readiness flag
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
