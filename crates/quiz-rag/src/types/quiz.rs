//! Quiz question and flashcard records

use serde::{Deserialize, Serialize};

use crate::generation::normalize;

/// Question type label, used both for requests and for emitted records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Four-option multiple choice
    Mcq,
    /// True / false statement
    #[serde(alias = "true_false", alias = "tf")]
    TrueFalse,
    /// Mix of both (request label only)
    #[default]
    Mixed,
}

impl QuestionType {
    /// Parse a request label, falling back to `Mixed` for anything unknown
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "mcq" => Self::Mcq,
            "truefalse" | "true_false" | "tf" => Self::TrueFalse,
            _ => Self::Mixed,
        }
    }

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::TrueFalse => "truefalse",
            Self::Mixed => "mixed",
        }
    }

    /// Phrase used inside generation prompts
    pub fn prompt_phrase(&self) -> &'static str {
        match self {
            Self::Mcq => "multiple-choice (4 options)",
            Self::TrueFalse => "true/false",
            Self::Mixed => "mixed multiple-choice and true/false",
        }
    }

    /// Infer the record type from its options
    pub fn infer(options: &[String]) -> Self {
        let is_tf = options.len() >= 2
            && options[0].eq_ignore_ascii_case("true")
            && options[1].eq_ignore_ascii_case("false");
        if is_tf {
            Self::TrueFalse
        } else {
            Self::Mcq
        }
    }
}

/// A validated quiz question
///
/// `correct_text` always equals `options[correct_index]`; the only way to
/// build one is [`ParsedQuestion::build`], which truncates the options first
/// and links the answer text afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    /// Position of the question within its response (1-based)
    pub id: u32,
    /// Question text
    pub question: String,
    /// Answer options in display order
    pub options: Vec<String>,
    /// Index of the correct option
    #[serde(rename = "correctAnswer")]
    pub correct_index: usize,
    /// Text of the correct option
    #[serde(rename = "correctAnswerText")]
    pub correct_text: String,
    /// Short explanation of the answer
    pub explanation: String,
    /// Record type
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

impl ParsedQuestion {
    /// Build a record from raw parts.
    ///
    /// Options are truncated to `max_option_chars` before the correct answer
    /// text is linked. An out-of-range `correct_index` is clamped to 0.
    /// A missing explanation becomes "The correct answer is ...".
    pub fn build(
        id: u32,
        question: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        explanation: Option<String>,
        max_option_chars: usize,
    ) -> Self {
        let options = normalize::format_options(&options, max_option_chars);
        let (correct_index, correct_text) = normalize::link_correct_answer(&options, correct_index);

        let explanation = explanation
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("The correct answer is {}", correct_text));

        let question_type = QuestionType::infer(&options);

        Self {
            id,
            question: question.into().trim().to_string(),
            options,
            correct_index,
            correct_text,
            explanation,
            question_type,
        }
    }

    /// Whether the answer linkage invariant holds
    pub fn is_consistent(&self) -> bool {
        self.options.get(self.correct_index) == Some(&self.correct_text)
    }
}

/// A two-sided study card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Position of the card within its response (1-based)
    pub id: u32,
    /// Prompt side
    pub front: String,
    /// Answer side
    pub back: String,
}

impl Flashcard {
    /// Create a card, or `None` if either side is blank
    pub fn new(id: u32, front: &str, back: &str) -> Option<Self> {
        let front = front.trim();
        let back = back.trim();
        if front.is_empty() || back.is_empty() {
            return None;
        }
        Some(Self {
            id,
            front: front.to_string(),
            back: back.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_links_correct_text() {
        let q = ParsedQuestion::build(
            1,
            "What is the capital of France?",
            opts(&["Berlin", "Paris", "Rome", "Madrid"]),
            1,
            None,
            100,
        );
        assert_eq!(q.correct_text, "Paris");
        assert_eq!(q.explanation, "The correct answer is Paris");
        assert_eq!(q.question_type, QuestionType::Mcq);
        assert!(q.is_consistent());
    }

    #[test]
    fn test_build_links_after_truncation() {
        let long = "x".repeat(150);
        let q = ParsedQuestion::build(
            1,
            "Pick the long one",
            opts(&["short", &long, "c", "d"]),
            1,
            Some("because".into()),
            100,
        );
        assert_eq!(q.options[1].chars().count(), 100);
        assert!(q.options[1].ends_with("..."));
        assert_eq!(q.correct_text, q.options[1]);
        assert!(q.is_consistent());
    }

    #[test]
    fn test_build_clamps_out_of_range_index() {
        let q = ParsedQuestion::build(2, "Q", opts(&["a", "b", "c", "d"]), 9, None, 100);
        assert_eq!(q.correct_index, 0);
        assert_eq!(q.correct_text, "a");
    }

    #[test]
    fn test_true_false_inferred() {
        let q = ParsedQuestion::build(1, "The sky is green.", opts(&["True", "False"]), 1, None, 100);
        assert_eq!(q.question_type, QuestionType::TrueFalse);
        assert_eq!(q.correct_text, "False");
    }

    #[test]
    fn test_serialized_field_names() {
        let q = ParsedQuestion::build(1, "Q", opts(&["a", "b", "c", "d"]), 2, None, 100);
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["correctAnswer"], 2);
        assert_eq!(value["correctAnswerText"], "c");
        assert_eq!(value["type"], "mcq");
    }

    #[test]
    fn test_flashcard_rejects_blank_side() {
        assert!(Flashcard::new(1, "  ", "back").is_none());
        assert!(Flashcard::new(1, "front", "").is_none());
        let card = Flashcard::new(3, " Mitochondria ", " Powerhouse of the cell ").unwrap();
        assert_eq!(card.front, "Mitochondria");
        assert_eq!(card.back, "Powerhouse of the cell");
    }

    #[test]
    fn test_question_type_labels() {
        assert_eq!(QuestionType::from_label("MCQ"), QuestionType::Mcq);
        assert_eq!(QuestionType::from_label("truefalse"), QuestionType::TrueFalse);
        assert_eq!(QuestionType::from_label("anything"), QuestionType::Mixed);
    }
}
