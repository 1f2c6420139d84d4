//! quiz-rag: turn an uploaded PDF into quizzes, flashcards and grounded chat
//!
//! The document is split into overlapping chunks, embedded, and kept in a
//! single in-memory [`retrieval::ChunkStore`]. Generation samples or searches
//! that store for context, prompts an LLM, and parses the reply into typed
//! questions and flashcards. Free-text answers are graded by embedding
//! similarity.

pub mod config;
pub mod error;
pub mod generation;
pub mod grading;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{Orchestrator, ParseFormat};
pub use grading::AnswerChecker;
pub use retrieval::ChunkStore;
pub use types::{
    Chunk, Flashcard, GenerationRequest, GenerationResult, ParsedQuestion, QuestionType,
};
