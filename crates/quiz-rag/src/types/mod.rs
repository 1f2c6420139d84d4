//! Core types for the quiz pipeline

pub mod chunk;
pub mod quiz;
pub mod request;
pub mod response;

pub use chunk::Chunk;
pub use quiz::{Flashcard, ParsedQuestion, QuestionType};
pub use request::{GenerationMode, GenerationRequest};
pub use response::{
    AnswerCheckResult, AnswerCheckSummary, ChatResponse, FailurePayload, FlashcardsResponse,
    GenerationResult, IngestResponse, QuizResponse, SingleFlashcardResponse,
    SingleQuestionResponse,
};
