//! Line-oriented response parsers
//!
//! Model output is untrusted. Each non-blank line is one candidate record;
//! a line that fails validation is dropped with a diagnostic and parsing
//! carries on with the next one.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

use crate::types::{Flashcard, ParsedQuestion};

use super::normalize::answer_letter_index;

/// Field separator of the delimited format
pub const DELIMITER: char = '|';

/// Column names of the delimited format, as shown to the model
pub const DELIMITED_HEADER: [&str; 7] = [
    "ANSWER",
    "QUESTION",
    "OPTION_A",
    "OPTION_B",
    "OPTION_C",
    "OPTION_D",
    "EXPLANATION",
];

/// Quiz line format requested from the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFormat {
    /// `answer|question|a|b|c|d[|explanation]`
    #[default]
    Delimited,
    /// Fixed character columns, see [`FixedWidthLayout`]
    FixedWidth,
}

impl ParseFormat {
    /// Line parser for this format
    pub fn line_parser(
        self,
        max_option_chars: usize,
        strict_fixed_width: bool,
    ) -> Box<dyn QuizLineParser> {
        match self {
            Self::Delimited => Box::new(DelimitedParser::new(max_option_chars)),
            Self::FixedWidth => Box::new(FixedWidthParser::new(max_option_chars, strict_fixed_width)),
        }
    }
}

/// Column layout of the fixed-width format (0-based, end-exclusive).
///
/// The prompt text is generated from these constants, so changing a range
/// here changes what the model is asked for.
pub struct FixedWidthLayout;

impl FixedWidthLayout {
    /// Full record width
    pub const WIDTH: usize = 130;
    /// Correct answer letter
    pub const ANSWER: Range<usize> = 0..1;
    /// Question text
    pub const QUESTION: Range<usize> = 2..30;
    /// Options A-D
    pub const OPTIONS: [Range<usize>; 4] = [31..55, 56..80, 81..105, 106..130];
    /// Columns that must hold a space
    pub const SEPARATORS: [usize; 5] = [1, 30, 55, 80, 105];
}

/// Why a line was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("{0} is empty")]
    EmptyField(&'static str),

    #[error("{0}")]
    Invalid(String),
}

/// A dropped record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// 1-based line (or item) number in the model output
    pub line: usize,
    pub reason: RejectReason,
}

/// Accepted records plus one diagnostic per dropped record
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome<T> {
    pub items: Vec<T>,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl<T> Default for ParseOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> ParseOutcome<T> {
    /// Record a dropped line and log it
    pub fn reject(&mut self, line: usize, reason: RejectReason) {
        tracing::warn!("Dropping record {}: {}", line, reason);
        self.diagnostics.push(LineDiagnostic { line, reason });
    }

    /// Whether nothing survived
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fields decoded from one quiz line, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFields {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: Option<String>,
}

/// Decoder for one quiz wire format
pub trait QuizLineParser: Send + Sync {
    /// Decode one line into raw fields
    fn decode(&self, line: &str) -> Result<QuestionFields, RejectReason>;

    /// Maximum characters per option after normalization
    fn max_option_chars(&self) -> usize;

    /// Decode and normalize one line. `None` when the line is rejected.
    fn parse_line(&self, line: &str) -> Option<ParsedQuestion> {
        self.decode(line)
            .ok()
            .map(|fields| self.build(1, fields))
    }

    /// Turn decoded fields into a record with answer linkage applied
    fn build(&self, id: u32, fields: QuestionFields) -> ParsedQuestion {
        ParsedQuestion::build(
            id,
            fields.question,
            fields.options,
            fields.correct_index,
            fields.explanation,
            self.max_option_chars(),
        )
    }
}

/// Parse every non-blank line. Accepted records get sequential ids from 1.
pub fn parse_quiz_lines(parser: &dyn QuizLineParser, text: &str) -> ParseOutcome<ParsedQuestion> {
    let mut outcome = ParseOutcome::default();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parser.decode(line) {
            Ok(fields) => {
                let id = outcome.items.len() as u32 + 1;
                outcome.items.push(parser.build(id, fields));
            }
            Err(reason) => outcome.reject(idx + 1, reason),
        }
    }

    outcome
}

/// Parser for `answer|question|a|b|c|d[|explanation]`
#[derive(Debug, Clone)]
pub struct DelimitedParser {
    max_option_chars: usize,
}

impl DelimitedParser {
    /// Fields every quiz line must carry
    pub const MIN_FIELDS: usize = 6;

    pub fn new(max_option_chars: usize) -> Self {
        Self { max_option_chars }
    }
}

impl QuizLineParser for DelimitedParser {
    fn decode(&self, line: &str) -> Result<QuestionFields, RejectReason> {
        let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if fields.len() < Self::MIN_FIELDS {
            return Err(RejectReason::TooFewFields {
                expected: Self::MIN_FIELDS,
                found: fields.len(),
            });
        }

        // echoed format line
        let is_header = fields.len() <= DELIMITED_HEADER.len()
            && fields
                .iter()
                .zip(DELIMITED_HEADER)
                .all(|(field, name)| field.eq_ignore_ascii_case(name));
        if is_header {
            return Err(RejectReason::Invalid("format header".to_string()));
        }

        const NAMES: [&str; 5] = ["question", "option A", "option B", "option C", "option D"];
        for (value, name) in fields[1..6].iter().zip(NAMES) {
            if value.is_empty() {
                return Err(RejectReason::EmptyField(name));
            }
        }

        let explanation = fields
            .get(6)
            .filter(|e| !e.is_empty())
            .map(|e| e.to_string());

        Ok(QuestionFields {
            question: fields[1].to_string(),
            options: fields[2..6].iter().map(|s| s.to_string()).collect(),
            correct_index: answer_letter_index(fields[0]),
            explanation,
        })
    }

    fn max_option_chars(&self) -> usize {
        self.max_option_chars
    }
}

/// Parser for the fixed column layout
#[derive(Debug, Clone)]
pub struct FixedWidthParser {
    max_option_chars: usize,
    /// Reject records whose question or options slice to empty
    strict: bool,
}

impl FixedWidthParser {
    pub fn new(max_option_chars: usize, strict: bool) -> Self {
        Self {
            max_option_chars,
            strict,
        }
    }

    fn slice(columns: &[char], range: Range<usize>) -> String {
        columns[range].iter().collect::<String>().trim().to_string()
    }
}

impl QuizLineParser for FixedWidthParser {
    fn decode(&self, line: &str) -> Result<QuestionFields, RejectReason> {
        let mut columns: Vec<char> = line.trim_end_matches(['\r', '\n']).chars().collect();
        if columns.len() < FixedWidthLayout::WIDTH {
            columns.resize(FixedWidthLayout::WIDTH, ' ');
        }

        let answer = Self::slice(&columns, FixedWidthLayout::ANSWER);
        let question = Self::slice(&columns, FixedWidthLayout::QUESTION);
        let options: Vec<String> = FixedWidthLayout::OPTIONS
            .iter()
            .map(|range| Self::slice(&columns, range.clone()))
            .collect();

        if self.strict {
            if question.is_empty() {
                return Err(RejectReason::EmptyField("question"));
            }
            if let Some(pos) = options.iter().position(|o| o.is_empty()) {
                const NAMES: [&str; 4] = ["option A", "option B", "option C", "option D"];
                return Err(RejectReason::EmptyField(NAMES[pos]));
            }
        }

        Ok(QuestionFields {
            question,
            options,
            correct_index: answer_letter_index(&answer),
            explanation: None,
        })
    }

    fn max_option_chars(&self) -> usize {
        self.max_option_chars
    }
}

/// Parse `front|back` lines. Accepted cards get sequential ids from 1.
pub fn parse_flashcard_lines(text: &str) -> ParseOutcome<Flashcard> {
    let mut outcome = ParseOutcome::default();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() < 2 {
            outcome.reject(
                idx + 1,
                RejectReason::TooFewFields {
                    expected: 2,
                    found: fields.len(),
                },
            );
            continue;
        }

        let id = outcome.items.len() as u32 + 1;
        match Flashcard::new(id, fields[0], fields[1]) {
            Some(card) => outcome.items.push(card),
            None => {
                let side = if fields[0].trim().is_empty() { "front" } else { "back" };
                outcome.reject(idx + 1, RejectReason::EmptyField(side));
            }
        }
    }

    outcome
}
