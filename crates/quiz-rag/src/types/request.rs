//! Generation requests and the HTTP parameter shapes that build them

use serde::{Deserialize, Serialize};

use super::quiz::QuestionType;
use crate::generation::ParseFormat;

/// What the orchestrator is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// A batch of questions (optionally with flashcards)
    Quiz,
    /// Exactly one question
    SingleQuestion,
    /// A batch of flashcards
    Flashcards,
    /// Exactly one flashcard
    SingleFlashcard,
    /// Grounded answer to a free-text message
    Chat,
}

/// A single generation request, consumed once by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// What to produce
    pub mode: GenerationMode,
    /// Number of items requested
    pub count: usize,
    /// Difficulty label (easy, medium, hard)
    pub difficulty: String,
    /// Question type label
    pub question_type: QuestionType,
    /// Topic hint
    pub topic: String,
    /// Previously seen questions / flashcard fronts to avoid
    pub exclusions: Vec<String>,
    /// Quiz mode: also produce flashcards (switches to the JSON format)
    pub include_flashcards: bool,
    /// Line format override. `None` keeps the mode's default
    /// (configured format for quizzes, JSON for single questions).
    pub format: Option<ParseFormat>,
    /// Chat mode: the user's message
    pub message: String,
}

impl GenerationRequest {
    fn base(mode: GenerationMode, count: usize) -> Self {
        Self {
            mode,
            count,
            difficulty: "medium".to_string(),
            question_type: QuestionType::Mixed,
            topic: "general".to_string(),
            exclusions: Vec::new(),
            include_flashcards: false,
            format: None,
            message: String::new(),
        }
    }

    /// Batch quiz request
    pub fn quiz(count: usize) -> Self {
        Self::base(GenerationMode::Quiz, count)
    }

    /// Single question request
    pub fn single_question() -> Self {
        let mut request = Self::base(GenerationMode::SingleQuestion, 1);
        request.question_type = QuestionType::Mcq;
        request
    }

    /// Batch flashcard request
    pub fn flashcards(count: usize) -> Self {
        Self::base(GenerationMode::Flashcards, count)
    }

    /// Single flashcard request
    pub fn single_flashcard() -> Self {
        Self::base(GenerationMode::SingleFlashcard, 1)
    }

    /// Chat request
    pub fn chat(message: impl Into<String>) -> Self {
        let mut request = Self::base(GenerationMode::Chat, 1);
        request.message = message.into();
        request
    }

    /// Set the topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the difficulty label
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    /// Set the question type
    pub fn with_question_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = question_type;
        self
    }

    /// Set the exclusion list
    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Ask for flashcards alongside the quiz
    pub fn with_flashcards(mut self, include: bool) -> Self {
        self.include_flashcards = include;
        self
    }

    /// Force a line format
    pub fn with_format(mut self, format: ParseFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Split a comma-separated exclusion list, dropping blanks
pub fn parse_exclusions(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn default_topic() -> String {
    "general".to_string()
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_count() -> usize {
    5
}

/// Query parameters for `POST /quiz/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct QuizParams {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_count")]
    pub num_questions: usize,
    #[serde(default)]
    pub include_flashcards: bool,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub question_type: Option<String>,
}

impl From<QuizParams> for GenerationRequest {
    fn from(params: QuizParams) -> Self {
        let question_type = params
            .question_type
            .as_deref()
            .map(QuestionType::from_label)
            .unwrap_or(QuestionType::Mixed);
        GenerationRequest::quiz(params.num_questions)
            .with_topic(params.topic)
            .with_difficulty(params.difficulty)
            .with_question_type(question_type)
            .with_flashcards(params.include_flashcards)
    }
}

/// Query parameters for `POST /quiz/generate-one`
#[derive(Debug, Clone, Deserialize)]
pub struct SingleQuestionParams {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub question_type: Option<String>,
    /// Comma-separated questions to avoid
    #[serde(default)]
    pub previous_questions: Option<String>,
}

impl From<SingleQuestionParams> for GenerationRequest {
    fn from(params: SingleQuestionParams) -> Self {
        let question_type = params
            .question_type
            .as_deref()
            .map(QuestionType::from_label)
            .unwrap_or(QuestionType::Mcq);
        GenerationRequest::single_question()
            .with_topic(params.topic)
            .with_difficulty(params.difficulty)
            .with_question_type(question_type)
            .with_exclusions(parse_exclusions(params.previous_questions.as_deref()))
    }
}

/// Query parameters for `POST /quiz/agent/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct FixedWidthQuizParams {
    #[serde(default = "default_count")]
    pub num_questions: usize,
}

/// Query parameters for `POST /quiz/agent/generate-one`
#[derive(Debug, Clone, Deserialize)]
pub struct FixedWidthSingleParams {
    #[serde(default)]
    pub previous_questions: Option<String>,
}

/// Query parameters for `POST /flashcards/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct FlashcardParams {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_count")]
    pub num_flashcards: usize,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Comma-separated fronts to avoid
    #[serde(default)]
    pub previous_flashcards: Option<String>,
}

impl From<FlashcardParams> for GenerationRequest {
    fn from(params: FlashcardParams) -> Self {
        GenerationRequest::flashcards(params.num_flashcards)
            .with_topic(params.topic)
            .with_difficulty(params.difficulty)
            .with_exclusions(parse_exclusions(params.previous_flashcards.as_deref()))
    }
}

/// Query parameters for `POST /flashcards/generate-one`
#[derive(Debug, Clone, Deserialize)]
pub struct SingleFlashcardParams {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub previous_flashcards: Option<String>,
}

impl From<SingleFlashcardParams> for GenerationRequest {
    fn from(params: SingleFlashcardParams) -> Self {
        GenerationRequest::single_flashcard()
            .with_topic(params.topic)
            .with_difficulty(params.difficulty)
            .with_exclusions(parse_exclusions(params.previous_flashcards.as_deref()))
    }
}

/// One submitted answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    #[serde(default)]
    pub user_answer: String,
    #[serde(default)]
    pub correct_answer: String,
}

/// Body of `POST /quiz/check-answers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAnswersRequest {
    pub answers: Vec<AnswerSubmission>,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}
