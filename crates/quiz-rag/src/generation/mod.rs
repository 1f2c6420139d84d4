//! Prompt assembly, response parsing and generation orchestration

pub mod json;
pub mod normalize;
mod orchestrator;
pub mod parser;
pub mod prompt;

pub use orchestrator::Orchestrator;
pub use parser::{
    DelimitedParser, FixedWidthLayout, FixedWidthParser, LineDiagnostic, ParseFormat,
    ParseOutcome, QuizLineParser, RejectReason,
};
pub use prompt::{PromptBuilder, PromptParams};
