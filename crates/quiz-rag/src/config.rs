//! Configuration for the quiz generation pipeline
//!
//! Everything the pipeline needs is carried in [`RagConfig`] and handed to
//! constructors explicitly. Nothing here reads the process environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::generation::ParseFormat;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Context selection configuration
    pub retrieval: RetrievalConfig,
    /// Prompt and parsing configuration
    pub generation: GenerationConfig,
    /// LLM / embedding collaborator configuration
    pub llm: LlmConfig,
    /// Answer grading configuration
    pub answer_check: AnswerCheckConfig,
}

impl RagConfig {
    /// Parse a configuration from TOML text. Missing sections fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject combinations the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.generation.max_option_chars < 4 {
            return Err(Error::Config(
                "generation.max_option_chars must leave room for the ellipsis".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.answer_check.similarity_threshold) {
            return Err(Error::Config(
                "answer_check.similarity_threshold must be within [0, 1]".into(),
            ));
        }
        if self.llm.provider == LlmBackend::Gemini && self.llm.gemini.api_key.is_none() {
            return Err(Error::Config("llm.gemini.api_key is required for the gemini provider".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Context selection and length caps, in characters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Below this, context counts as "no content" and generation is skipped
    pub min_context_chars: usize,
    /// Below this, chat answers with the canned "not found" response
    pub chat_min_context_chars: usize,
    /// Nearest neighbours used for chat context
    pub chat_top_k: usize,
    /// Cap for batch quiz / flashcard context
    pub max_batch_context_chars: usize,
    /// Cap for single question / flashcard context
    pub max_single_context_chars: usize,
    /// Cap for fixed-width batch context
    pub max_fixed_width_batch_context_chars: usize,
    /// Cap for fixed-width single question context
    pub max_fixed_width_single_context_chars: usize,
    /// Cap for chat context
    pub max_chat_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_context_chars: 50,
            chat_min_context_chars: 20,
            chat_top_k: 5,
            max_batch_context_chars: 2000,
            max_single_context_chars: 1500,
            max_fixed_width_batch_context_chars: 1500,
            max_fixed_width_single_context_chars: 800,
            max_chat_context_chars: 2000,
        }
    }
}

/// Prompt assembly and response parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Line format requested for batch quizzes without flashcards
    pub quiz_format: ParseFormat,
    /// Maximum characters per answer option
    pub max_option_chars: usize,
    /// Maximum previously-seen items listed in the exclusion clause
    pub max_exclusions: usize,
    /// Largest item count a single batch request may ask for
    pub max_batch_items: usize,
    /// Flashcards requested alongside a quiz
    pub flashcards_with_quiz: usize,
    /// Reject fixed-width records whose question or options come out empty
    pub strict_fixed_width: bool,
    /// Minimum chat message length
    pub min_chat_message_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            quiz_format: ParseFormat::Delimited,
            max_option_chars: 100,
            max_exclusions: 5,
            max_batch_items: 20,
            flashcards_with_quiz: 5,
            strict_fixed_width: true,
            min_chat_message_chars: 2,
        }
    }
}

/// Which text generation backend to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Google Gemini `generateContent` API
    Gemini,
}

/// LLM configuration. Embeddings always come from Ollama so that chunk
/// indexing and answer grading share one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Generation backend
    pub provider: LlmBackend,
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name (Ollama)
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed collaborator requests
    pub max_retries: u32,
    /// Gemini settings, used when `provider = "gemini"`
    pub gemini: GeminiConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            embed_model: "all-minilm".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_retries: 2,
            gemini: GeminiConfig::default(),
        }
    }
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key
    pub api_key: Option<String>,
    /// Maximum output tokens
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash-lite".to_string(),
            api_key: None,
            max_output_tokens: 4096,
        }
    }
}

/// Answer grading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerCheckConfig {
    /// Cosine similarity strictly above this counts as correct
    pub similarity_threshold: f32,
}

impl Default for AnswerCheckConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.90,
        }
    }
}
