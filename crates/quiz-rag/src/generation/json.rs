//! Direct-JSON response decoding
//!
//! Used for single questions and for quizzes that come with flashcards.
//! The model is asked for bare JSON but often wraps it in a markdown fence
//! or a sentence of prose, so both are peeled off before decoding.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

use crate::types::{Flashcard, ParsedQuestion, QuestionType};

use super::normalize::answer_letter_index;
use super::parser::{ParseOutcome, RejectReason};

/// Options of a multiple-choice question
const MCQ_OPTIONS: usize = 4;
/// Options of a true/false question
const TRUE_FALSE_OPTIONS: usize = 2;

/// Output that is not JSON at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndecodableResponse {
    /// The model output as received
    pub raw: String,
    /// Decoder message
    pub message: String,
}

/// Decoded quiz bundle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuizBundle {
    pub questions: ParseOutcome<ParsedQuestion>,
    pub flashcards: ParseOutcome<Flashcard>,
}

fn fence_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*```[A-Za-z]*[ \t]*\r?\n?").expect("Invalid regex"))
}

fn fence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n?[ \t]*```\s*$").expect("Invalid regex"))
}

/// Remove a leading and/or trailing triple-backtick fence
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let start = fence_start().find(text).map(|m| m.end()).unwrap_or(0);
    let body = &text[start..];
    let end = fence_end().find(body).map(|m| m.start()).unwrap_or(body.len());
    body[..end].trim()
}

/// Decode the first JSON value in `raw`, tolerating fences and surrounding prose
fn decode_value(raw: &str) -> Result<Value, UndecodableResponse> {
    let body = strip_code_fence(raw);

    let first_error = match serde_json::from_str::<Value>(body) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (body.find(open), body.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&body[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(UndecodableResponse {
        raw: raw.to_string(),
        message: first_error.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct JsonQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<Value>,
    #[serde(default, rename = "correctAnswer", alias = "correct_answer")]
    correct_answer: Option<Value>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonFlashcard {
    #[serde(default)]
    front: String,
    #[serde(default)]
    back: String,
}

/// Interpret `correctAnswer` given as a number, a digit string or a letter
fn correct_index(value: Option<&Value>) -> usize {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                // 2.0 is as good as 2
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .map(|n| n as usize)
            .unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<usize>()
            .unwrap_or_else(|_| answer_letter_index(s)),
        _ => 0,
    }
}

fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn question_from_value(
    id: u32,
    value: Value,
    max_option_chars: usize,
) -> Result<ParsedQuestion, RejectReason> {
    let raw: JsonQuestion =
        serde_json::from_value(value).map_err(|e| RejectReason::Invalid(e.to_string()))?;

    if raw.question.trim().is_empty() {
        return Err(RejectReason::EmptyField("question"));
    }

    let options: Vec<String> = raw.options.iter().map(option_text).collect();
    let expected = match QuestionType::infer(&options) {
        QuestionType::TrueFalse => TRUE_FALSE_OPTIONS,
        // `infer` never yields `Mixed`; it falls back to Mcq
        QuestionType::Mcq | QuestionType::Mixed => MCQ_OPTIONS,
    };
    if options.len() != expected {
        return Err(RejectReason::Invalid(format!(
            "expected {} options, found {}",
            expected,
            options.len()
        )));
    }
    if options.iter().any(|o| o.is_empty()) {
        return Err(RejectReason::EmptyField("option"));
    }

    Ok(ParsedQuestion::build(
        id,
        raw.question,
        options,
        correct_index(raw.correct_answer.as_ref()),
        raw.explanation,
        max_option_chars,
    ))
}

/// Decode a single question object (a one-element array is accepted too)
pub fn decode_question(
    raw: &str,
    max_option_chars: usize,
) -> Result<Result<ParsedQuestion, RejectReason>, UndecodableResponse> {
    let value = match decode_value(raw)? {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(Err(RejectReason::Invalid("empty array".to_string()))),
        },
        Value::Object(mut map) if !map.contains_key("question") && map.contains_key("quiz") => {
            match map.remove("quiz") {
                Some(Value::Array(items)) if !items.is_empty() => {
                    items.into_iter().next().unwrap_or(Value::Null)
                }
                _ => return Ok(Err(RejectReason::Invalid("empty quiz".to_string()))),
            }
        }
        other => other,
    };

    Ok(question_from_value(1, value, max_option_chars))
}

/// Decode `{quiz: [...], flashcards: [...]}`. A bare array is read as the quiz.
///
/// Invalid items are dropped with diagnostics. Ids are reassigned
/// sequentially over the accepted items.
pub fn decode_quiz_bundle(
    raw: &str,
    max_option_chars: usize,
) -> Result<QuizBundle, UndecodableResponse> {
    let (quiz, cards) = match decode_value(raw)? {
        Value::Array(items) => (items, Vec::new()),
        Value::Object(mut map) => {
            let take = |map: &mut serde_json::Map<String, Value>, key: &str| match map.remove(key) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            (take(&mut map, "quiz"), take(&mut map, "flashcards"))
        }
        _ => (Vec::new(), Vec::new()),
    };

    let mut bundle = QuizBundle::default();

    for (idx, value) in quiz.into_iter().enumerate() {
        let id = bundle.questions.items.len() as u32 + 1;
        match question_from_value(id, value, max_option_chars) {
            Ok(question) => bundle.questions.items.push(question),
            Err(reason) => bundle.questions.reject(idx + 1, reason),
        }
    }

    for (idx, value) in cards.into_iter().enumerate() {
        let id = bundle.flashcards.items.len() as u32 + 1;
        let card = serde_json::from_value::<JsonFlashcard>(value)
            .map_err(|e| RejectReason::Invalid(e.to_string()))
            .and_then(|c| {
                Flashcard::new(id, &c.front, &c.back)
                    .ok_or(RejectReason::EmptyField("front or back"))
            });
        match card {
            Ok(card) => bundle.flashcards.items.push(card),
            Err(reason) => bundle.flashcards.reject(idx + 1, reason),
        }
    }

    Ok(bundle)
}
