//! Response payloads
//!
//! Failure payloads share the shape of an empty success so callers can handle
//! every outcome the same way.

use serde::{Deserialize, Serialize};

use super::quiz::{Flashcard, ParsedQuestion};

/// Message returned when nothing has been uploaded yet
pub const NO_CONTENT_MESSAGE: &str = "No content found. Upload a PDF first.";

/// Canned chat answer when retrieval finds nothing useful
pub const CHAT_NOT_FOUND_MESSAGE: &str =
    "I couldn't find relevant information in the uploaded document to answer that question.";

/// Chat answer when a collaborator call fails
pub const CHAT_UNAVAILABLE_MESSAGE: &str =
    "Sorry, I couldn't generate a response right now. Please try again.";

/// Batch quiz response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizResponse {
    /// Parsed questions
    pub quiz: Vec<ParsedQuestion>,
    /// Flashcards, present when they were requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashcards: Option<Vec<Flashcard>>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw model output, kept when it could not be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    /// Set when the model output could not be decoded at all
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parse_failed: bool,
}

impl QuizResponse {
    /// Successful response
    pub fn new(quiz: Vec<ParsedQuestion>, flashcards: Option<Vec<Flashcard>>) -> Self {
        Self {
            quiz,
            flashcards,
            ..Default::default()
        }
    }

    /// Empty response carrying an error
    pub fn failure(message: impl Into<String>, include_flashcards: bool) -> Self {
        Self {
            flashcards: include_flashcards.then(Vec::new),
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Empty response for undecodable model output
    pub fn parse_failure(raw: impl Into<String>, include_flashcards: bool) -> Self {
        Self {
            raw_response: Some(raw.into()),
            parse_failed: true,
            ..Self::failure("Failed to parse JSON from LLM response", include_flashcards)
        }
    }

    /// Whether the response carries an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Batch flashcard response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashcardsResponse {
    /// Parsed flashcards
    pub flashcards: Vec<Flashcard>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FlashcardsResponse {
    /// Successful response
    pub fn new(flashcards: Vec<Flashcard>) -> Self {
        Self {
            flashcards,
            error: None,
        }
    }

    /// Empty response carrying an error
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            flashcards: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Error body for single-item requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailurePayload {
    /// Failure reason
    pub error: String,
    /// Raw model output, kept when it could not be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    /// Set when the model output could not be decoded at all
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parse_failed: bool,
}

impl FailurePayload {
    /// Plain failure
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            ..Default::default()
        }
    }

    /// Failure with the undecodable model output attached
    pub fn parse_failure(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            raw_response: Some(raw.into()),
            parse_failed: true,
        }
    }
}

/// One question, or an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SingleQuestionResponse {
    Question(ParsedQuestion),
    Failure(FailurePayload),
}

impl SingleQuestionResponse {
    /// Failure shortcut
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(FailurePayload::new(message))
    }

    /// The question, if generation succeeded
    pub fn question(&self) -> Option<&ParsedQuestion> {
        match self {
            Self::Question(q) => Some(q),
            Self::Failure(_) => None,
        }
    }
}

/// One flashcard, or an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SingleFlashcardResponse {
    Flashcard(Flashcard),
    Failure(FailurePayload),
}

impl SingleFlashcardResponse {
    /// Failure shortcut
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(FailurePayload::new(message))
    }

    /// The card, if generation succeeded
    pub fn flashcard(&self) -> Option<&Flashcard> {
        match self {
            Self::Flashcard(card) => Some(card),
            Self::Failure(_) => None,
        }
    }
}

/// Grading outcome for one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCheckResult {
    pub question_id: i64,
    pub user_answer: String,
    pub correct_answer: String,
    /// Similarity in [0, 1]
    pub similarity: f32,
    pub is_correct: bool,
}

/// Grading outcome for a whole quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCheckSummary {
    pub results: Vec<AnswerCheckResult>,
    pub score: usize,
    pub total: usize,
    /// `score / total * 100`, or 0 when there are no answers
    pub percentage: f64,
}

/// Chat answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated (or canned) answer
    pub response: String,
    /// The message that was asked
    pub query: String,
}

/// Document upload outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub chunks_count: usize,
}

/// Result of [`crate::generation::Orchestrator::run`], one variant per mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationResult {
    Quiz(QuizResponse),
    Question(SingleQuestionResponse),
    Flashcards(FlashcardsResponse),
    Flashcard(SingleFlashcardResponse),
    Chat(ChatResponse),
}
