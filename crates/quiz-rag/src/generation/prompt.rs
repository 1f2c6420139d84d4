//! Prompt templates for quiz, flashcard and chat generation
//!
//! Every quiz/flashcard prompt spells out the exact output format the
//! parsers in this module accept. The builder never calls the model.

use crate::types::{GenerationRequest, QuestionType};

use super::parser::{FixedWidthLayout, DELIMITED_HEADER, DELIMITER};

/// Request parameters a prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct PromptParams<'a> {
    /// Items requested
    pub count: usize,
    /// Difficulty label
    pub difficulty: &'a str,
    /// Question type label
    pub question_type: QuestionType,
    /// Topic hint
    pub topic: &'a str,
    /// Previously seen items, already capped
    pub exclusions: &'a [String],
}

impl<'a> PromptParams<'a> {
    /// Borrow parameters from a request, keeping at most `max_exclusions` exclusions
    pub fn from_request(request: &'a GenerationRequest, max_exclusions: usize) -> Self {
        let keep = request.exclusions.len().min(max_exclusions);
        Self {
            count: request.count.max(1),
            difficulty: &request.difficulty,
            question_type: request.question_type,
            topic: &request.topic,
            exclusions: &request.exclusions[..keep],
        }
    }
}

/// Prompt builder for generation requests
pub struct PromptBuilder;

impl PromptBuilder {
    /// "Do not repeat" clause, empty when there is nothing to exclude
    pub fn exclusion_clause(exclusions: &[String]) -> String {
        if exclusions.is_empty() {
            return String::new();
        }
        let listed = exclusions
            .iter()
            .map(|e| format!("- {}", e.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "\nDo NOT repeat or closely paraphrase any of these previously generated items:\n{}\n",
            listed
        )
    }

    fn topic_line(topic: &str) -> String {
        let topic = topic.trim();
        if topic.is_empty() || topic.eq_ignore_ascii_case("general") {
            String::new()
        } else {
            format!("Focus on the topic: {}\n", topic)
        }
    }

    fn type_rules(question_type: QuestionType) -> &'static str {
        match question_type {
            QuestionType::Mcq => "- Every question is multiple choice with four distinct options",
            QuestionType::TrueFalse => {
                "- Every question is a true/false statement: option A is True, option B is False, option C is Partially true, option D is Not stated in the text"
            }
            QuestionType::Mixed => {
                "- Mix multiple-choice questions with true/false statements; for true/false use True, False, Partially true, Not stated in the text as options A-D"
            }
        }
    }

    /// Batch quiz in the delimited line format
    pub fn quiz_delimited(params: &PromptParams<'_>, context: &str, max_option_chars: usize) -> String {
        format!(
            r#"You are a quiz generator. Write exactly {count} {difficulty} {kind} questions using ONLY the text below.
{topic}{exclusions}
TEXT:
{context}

OUTPUT FORMAT - one question per line, fields separated by '{d}', nothing else:
{header}

Rules:
- ANSWER is the single letter (A, B, C or D) of the correct option
{type_rules}
- Each option is at most {max_option_chars} characters
- Never use the '{d}' character inside a field
- No numbering, no headers, no blank lines, no markdown

Example:
B{d}What is the capital of France?{d}Berlin{d}Paris{d}Rome{d}Madrid{d}Paris is the capital of France"#,
            count = params.count,
            difficulty = params.difficulty,
            kind = params.question_type.prompt_phrase(),
            topic = Self::topic_line(params.topic),
            exclusions = Self::exclusion_clause(params.exclusions),
            context = context,
            d = DELIMITER,
            header = DELIMITED_HEADER.join(&DELIMITER.to_string()),
            type_rules = Self::type_rules(params.question_type),
            max_option_chars = max_option_chars,
        )
    }

    /// Column map instruction for the fixed-width format, derived from
    /// [`FixedWidthLayout`] (1-indexed, inclusive, as the model reads it)
    pub fn fixed_width_character_map() -> String {
        let span = |r: &std::ops::Range<usize>| (r.start + 1, r.end, r.end - r.start);

        let (a_start, _, _) = span(&FixedWidthLayout::ANSWER);
        let (q_start, q_end, q_len) = span(&FixedWidthLayout::QUESTION);

        let mut map = format!(
            "Generate a quiz where each line follows this character map. Use spaces for padding. \
             Char {}: Correct Option (A/B/C/D). Char {}-{}: Question ({} chars).",
            a_start, q_start, q_end, q_len
        );

        for (i, range) in FixedWidthLayout::OPTIONS.iter().enumerate() {
            let (start, end, len) = span(range);
            map.push_str(&format!(" Char {}-{}: Option {} ({} chars).", start, end, i + 1, len));
        }

        let separators = FixedWidthLayout::SEPARATORS
            .iter()
            .map(|s| (s + 1).to_string())
            .collect::<Vec<_>>();
        let (last, rest) = separators.split_last().map(|(l, r)| (l.clone(), r.join(", "))).unwrap_or_default();

        map.push_str(&format!(
            " Ensure spaces at indexes {}, and {}. Every line is exactly {} characters. Output only the data strings.",
            rest,
            last,
            FixedWidthLayout::WIDTH
        ));
        map
    }

    /// Quiz in the fixed-width format (batch or single)
    pub fn quiz_fixed_width(params: &PromptParams<'_>, context: &str) -> String {
        let task = if params.count == 1 {
            "Generate only 1 line following the exact character format.".to_string()
        } else {
            format!(
                "Remember to follow the exact character format specified. Generate {} lines, one per question.",
                params.count
            )
        };

        format!(
            r#"{character_map}

Based on the following text, generate exactly {count} quiz question{plural}.
Each question should test understanding of key concepts from the text.{exclusions}
TEXT:
{context}

{task}"#,
            character_map = Self::fixed_width_character_map(),
            count = params.count,
            plural = if params.count == 1 { "" } else { "s" },
            exclusions = Self::exclusion_clause(params.exclusions),
            context = context,
            task = task,
        )
    }

    /// One question as a JSON object
    pub fn single_question_json(params: &PromptParams<'_>, context: &str, max_option_chars: usize) -> String {
        format!(
            r#"Generate exactly 1 {difficulty} {kind} question from this text.
{topic}{exclusions}
TEXT:
{context}

RESPOND WITH ONLY PLAIN JSON TEXT. NO MARKDOWN. NO CODE BLOCKS. NO EXPLANATION.
Just return this exact format with your content:
{{"id":1,"question":"your question here","options":["Option A","Option B","Option C","Option D"],"correctAnswer":0,"correctAnswerText":"Option A","explanation":"brief explanation","type":"mcq"}}

Rules:
- correctAnswer is the index (0-3 for multiple choice, 0-1 for true/false)
- correctAnswerText is the exact text of the correct option
- The question must come directly from the provided text
- Each option is at most {max_option_chars} characters
- For true/false the options are ["True","False"] and type is "truefalse"
- OUTPUT ONLY THE JSON OBJECT, NOTHING ELSE"#,
            difficulty = params.difficulty,
            kind = params.question_type.prompt_phrase(),
            topic = Self::topic_line(params.topic),
            exclusions = Self::exclusion_clause(params.exclusions),
            context = context,
            max_option_chars = max_option_chars,
        )
    }

    /// Quiz plus flashcards as one JSON object
    pub fn quiz_with_flashcards_json(
        params: &PromptParams<'_>,
        flashcards: usize,
        context: &str,
        max_option_chars: usize,
    ) -> String {
        format!(
            r#"Generate {count} {difficulty} {kind} questions from this text. Include {flashcards} flashcards.
{topic}{exclusions}
TEXT:
{context}

RESPOND WITH ONLY PLAIN JSON TEXT. NO MARKDOWN. NO CODE BLOCKS. NO EXPLANATION.
{{"quiz":[{{"id":1,"question":"...","options":["A","B","C","D"],"correctAnswer":0,"correctAnswerText":"A","explanation":"...","type":"mcq"}}],"flashcards":[{{"id":1,"front":"...","back":"..."}}]}}

Rules: correctAnswer=index (0-3 multiple choice, 0-1 true/false), correctAnswerText=exact option text, options at most {max_option_chars} characters, questions from the text only.
OUTPUT ONLY THE JSON OBJECT, NOTHING ELSE."#,
            count = params.count,
            difficulty = params.difficulty,
            kind = params.question_type.prompt_phrase(),
            flashcards = flashcards,
            topic = Self::topic_line(params.topic),
            exclusions = Self::exclusion_clause(params.exclusions),
            context = context,
            max_option_chars = max_option_chars,
        )
    }

    /// Flashcards in the delimited line format
    pub fn flashcards_delimited(params: &PromptParams<'_>, context: &str) -> String {
        format!(
            r#"You are a study assistant. Write exactly {count} {difficulty} flashcard{plural} using ONLY the text below.
{topic}{exclusions}
TEXT:
{context}

OUTPUT FORMAT - one flashcard per line, two fields separated by '{d}', nothing else:
FRONT{d}BACK

Rules:
- FRONT is a term, concept or short question from the text
- BACK is a concise definition or answer (one or two sentences)
- Never use the '{d}' character inside a field
- No numbering, no headers, no blank lines, no markdown

Example:
Mitochondria{d}The organelle that produces most of the cell's energy"#,
            count = params.count,
            difficulty = params.difficulty,
            plural = if params.count == 1 { "" } else { "s" },
            topic = Self::topic_line(params.topic),
            exclusions = Self::exclusion_clause(params.exclusions),
            context = context,
            d = DELIMITER,
        )
    }

    /// Grounded chat answer
    pub fn chat(message: &str, context: &str) -> String {
        format!(
            r#"You are a helpful study assistant that ONLY uses information from the uploaded document.

RULES:
1. Answer using ONLY information stated in the CONTEXT below
2. If the answer is not in the context, say that the document does not cover it
3. Keep the answer short and clear, suitable for a student

CONTEXT FROM THE DOCUMENT:
{context}

QUESTION: {message}

Answer:"#,
            context = context,
            message = message.trim(),
        )
    }
}
