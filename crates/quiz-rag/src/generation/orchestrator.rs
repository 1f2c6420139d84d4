//! Generation orchestrator
//!
//! RETRIEVE -> (insufficient content? soft error) -> ASSEMBLE PROMPT ->
//! CALL MODEL -> PARSE/VALIDATE -> (zero records? soft error) -> RETURN.
//!
//! Collaborator failures never escape as errors. They become the same
//! payload shape as a success with zero items, carrying an `error` message.
//! Only caller mistakes are returned as [`Error::InvalidInput`].

use std::sync::Arc;

use crate::config::{GenerationConfig, RagConfig, RetrievalConfig};
use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::retrieval::{is_sufficient, truncate_chars, ChunkStore, RetrievalEngine};
use crate::types::response::{CHAT_NOT_FOUND_MESSAGE, CHAT_UNAVAILABLE_MESSAGE, NO_CONTENT_MESSAGE};
use crate::types::{
    ChatResponse, FailurePayload, FlashcardsResponse, GenerationMode, GenerationRequest,
    GenerationResult, QuizResponse, SingleFlashcardResponse, SingleQuestionResponse,
};

use super::json::{decode_question, decode_quiz_bundle};
use super::parser::{parse_flashcard_lines, parse_quiz_lines, ParseFormat};
use super::prompt::{PromptBuilder, PromptParams};

const QUIZ_PARSE_FAILED: &str = "Failed to parse quiz questions from model response";
const QUESTION_PARSE_FAILED: &str = "Failed to parse question";
const FLASHCARDS_PARSE_FAILED: &str = "Failed to parse flashcards from model response";
const FLASHCARD_PARSE_FAILED: &str = "Failed to generate flashcard";

/// Context sizing for one kind of request
#[derive(Debug, Clone, Copy)]
struct ContextPlan {
    chunks: usize,
    max_chars: usize,
}

/// Sequences retrieval, prompting, the model call and parsing
#[derive(Clone)]
pub struct Orchestrator {
    retrieval: RetrievalEngine,
    llm: Arc<dyn LlmProvider>,
    retrieval_config: RetrievalConfig,
    generation_config: GenerationConfig,
}

impl Orchestrator {
    /// Create an orchestrator over a shared chunk store
    pub fn new(store: Arc<ChunkStore>, llm: Arc<dyn LlmProvider>, config: &RagConfig) -> Self {
        Self {
            retrieval: RetrievalEngine::new(store),
            llm,
            retrieval_config: config.retrieval.clone(),
            generation_config: config.generation.clone(),
        }
    }

    /// The retrieval engine
    pub fn retrieval(&self) -> &RetrievalEngine {
        &self.retrieval
    }

    /// Dispatch a request on its mode
    pub async fn run(&self, request: GenerationRequest) -> Result<GenerationResult> {
        Ok(match request.mode {
            GenerationMode::Quiz => GenerationResult::Quiz(self.generate_quiz(&request).await?),
            GenerationMode::SingleQuestion => {
                GenerationResult::Question(self.generate_question(&request).await?)
            }
            GenerationMode::Flashcards => {
                GenerationResult::Flashcards(self.generate_flashcards(&request).await?)
            }
            GenerationMode::SingleFlashcard => {
                GenerationResult::Flashcard(self.generate_flashcard(&request).await?)
            }
            GenerationMode::Chat => GenerationResult::Chat(self.chat(&request.message).await?),
        })
    }

    fn check_count(&self, count: usize) -> Result<()> {
        let max = self.generation_config.max_batch_items;
        if count == 0 || count > max {
            return Err(Error::invalid_input(format!(
                "Requested count must be between 1 and {}, got {}",
                max, count
            )));
        }
        Ok(())
    }

    /// `min(3, max(2, count / 2))` chunks for batch requests
    fn batch_chunks(count: usize) -> usize {
        (count / 2).max(2).min(3)
    }

    /// Sample and cap context. `None` when there is not enough to work with.
    fn select_context(&self, plan: ContextPlan) -> Option<String> {
        let context = self.retrieval.sample_context(plan.chunks);
        tracing::debug!(
            "Sampled {} chunk(s), {} chars of context",
            plan.chunks,
            context.chars().count()
        );
        let context = truncate_chars(&context, plan.max_chars);
        if is_sufficient(context, self.retrieval_config.min_context_chars) {
            Some(context.to_string())
        } else {
            tracing::warn!("Insufficient context for generation");
            None
        }
    }

    /// Call the model, logging the failure cause
    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let result = self.llm.complete(prompt).await;
        match &result {
            Ok(text) => tracing::info!(
                "{} ({}) returned {} chars in {}ms",
                self.llm.name(),
                self.llm.model(),
                text.len(),
                start.elapsed().as_millis()
            ),
            Err(e) if e.is_upstream() => {
                tracing::warn!("{} unavailable: {}", self.llm.name(), e)
            }
            Err(e) => tracing::error!("{} generation failed: {}", self.llm.name(), e),
        }
        result
    }

    fn quiz_format(&self, request: &GenerationRequest) -> ParseFormat {
        request.format.unwrap_or(self.generation_config.quiz_format)
    }

    /// Batch quiz. JSON mode when flashcards are requested, otherwise the
    /// request's line format (or the configured default).
    pub async fn generate_quiz(&self, request: &GenerationRequest) -> Result<QuizResponse> {
        self.check_count(request.count)?;
        let include_flashcards = request.include_flashcards;
        let format = self.quiz_format(request);

        let plan = if !include_flashcards && format == ParseFormat::FixedWidth {
            ContextPlan {
                chunks: request.count.min(3),
                max_chars: self.retrieval_config.max_fixed_width_batch_context_chars,
            }
        } else {
            ContextPlan {
                chunks: Self::batch_chunks(request.count),
                max_chars: self.retrieval_config.max_batch_context_chars,
            }
        };

        let Some(context) = self.select_context(plan) else {
            return Ok(QuizResponse::failure(NO_CONTENT_MESSAGE, include_flashcards));
        };

        Ok(self.quiz_from_context(request, format, &context).await)
    }

    async fn quiz_from_context(
        &self,
        request: &GenerationRequest,
        format: ParseFormat,
        context: &str,
    ) -> QuizResponse {
        let cfg = &self.generation_config;
        let params = PromptParams::from_request(request, cfg.max_exclusions);

        // Flashcards ride along only in the JSON bundle
        if request.include_flashcards {
            let prompt = PromptBuilder::quiz_with_flashcards_json(
                &params,
                cfg.flashcards_with_quiz,
                context,
                cfg.max_option_chars,
            );
            let raw = match self.complete(&prompt).await {
                Ok(raw) => raw,
                Err(e) => return QuizResponse::failure(e.to_string(), true),
            };

            return match decode_quiz_bundle(&raw, cfg.max_option_chars) {
                Ok(mut bundle) => {
                    if bundle.questions.is_empty() {
                        return QuizResponse::failure(QUIZ_PARSE_FAILED, true);
                    }
                    // The model may over-deliver
                    bundle.questions.items.truncate(request.count);
                    bundle.flashcards.items.truncate(cfg.flashcards_with_quiz);
                    QuizResponse::new(bundle.questions.items, Some(bundle.flashcards.items))
                }
                Err(e) => {
                    tracing::warn!("Quiz JSON could not be decoded: {}", e.message);
                    QuizResponse::parse_failure(e.raw, true)
                }
            };
        }

        // Line formats: build prompt, call model, parse line by line
        let prompt = match format {
            ParseFormat::Delimited => {
                PromptBuilder::quiz_delimited(&params, context, cfg.max_option_chars)
            }
            ParseFormat::FixedWidth => PromptBuilder::quiz_fixed_width(&params, context),
        };

        let raw = match self.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => return QuizResponse::failure(e.to_string(), false),
        };

        let parser = format.line_parser(cfg.max_option_chars, cfg.strict_fixed_width);
        let mut outcome = parse_quiz_lines(parser.as_ref(), &raw);
        tracing::info!(
            "Parsed {} question(s), dropped {} line(s)",
            outcome.items.len(),
            outcome.diagnostics.len()
        );

        if outcome.is_empty() {
            return QuizResponse::failure(QUIZ_PARSE_FAILED, false);
        }
        // Ids stay 1..=n after the cut
        outcome.items.truncate(request.count);
        QuizResponse::new(outcome.items, None)
    }

    /// Fixed-width batch quiz. Missing content is a caller error here.
    pub async fn generate_fixed_width_quiz(&self, count: usize) -> Result<QuizResponse> {
        self.check_count(count)?;
        let request = GenerationRequest::quiz(count).with_format(ParseFormat::FixedWidth);
        let plan = ContextPlan {
            chunks: count.min(3),
            max_chars: self.retrieval_config.max_fixed_width_batch_context_chars,
        };
        let context = self
            .select_context(plan)
            .ok_or_else(|| Error::invalid_input(NO_CONTENT_MESSAGE))?;

        Ok(self
            .quiz_from_context(&request, ParseFormat::FixedWidth, &context)
            .await)
    }

    /// One question. JSON unless the request asks for the fixed-width format.
    pub async fn generate_question(
        &self,
        request: &GenerationRequest,
    ) -> Result<SingleQuestionResponse> {
        let format = request.format;
        let max_chars = match format {
            Some(ParseFormat::FixedWidth) => {
                self.retrieval_config.max_fixed_width_single_context_chars
            }
            _ => self.retrieval_config.max_single_context_chars,
        };

        let Some(context) = self.select_context(ContextPlan { chunks: 1, max_chars }) else {
            return Ok(SingleQuestionResponse::failure(NO_CONTENT_MESSAGE));
        };

        Ok(self.question_from_context(request, &context).await)
    }

    async fn question_from_context(
        &self,
        request: &GenerationRequest,
        context: &str,
    ) -> SingleQuestionResponse {
        let cfg = &self.generation_config;
        let mut params = PromptParams::from_request(request, cfg.max_exclusions);
        params.count = 1;

        if request.format == Some(ParseFormat::FixedWidth) {
            let prompt = PromptBuilder::quiz_fixed_width(&params, context);
            let raw = match self.complete(&prompt).await {
                Ok(raw) => raw,
                Err(e) => return SingleQuestionResponse::failure(e.to_string()),
            };
            let parser = ParseFormat::FixedWidth.line_parser(cfg.max_option_chars, cfg.strict_fixed_width);
            let outcome = parse_quiz_lines(parser.as_ref(), &raw);
            return match outcome.items.into_iter().next() {
                Some(question) => SingleQuestionResponse::Question(question),
                None => SingleQuestionResponse::failure("Failed to generate question"),
            };
        }

        let prompt = PromptBuilder::single_question_json(&params, context, cfg.max_option_chars);
        let raw = match self.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => return SingleQuestionResponse::failure(e.to_string()),
        };

        match decode_question(&raw, cfg.max_option_chars) {
            Ok(Ok(question)) => SingleQuestionResponse::Question(question),
            Ok(Err(reason)) => {
                tracing::warn!("Generated question rejected: {}", reason);
                SingleQuestionResponse::failure(QUESTION_PARSE_FAILED)
            }
            Err(e) => {
                tracing::warn!("Question JSON could not be decoded: {}", e.message);
                SingleQuestionResponse::Failure(FailurePayload::parse_failure(
                    QUESTION_PARSE_FAILED,
                    e.raw,
                ))
            }
        }
    }

    /// Fixed-width single question. Missing content is a caller error here.
    pub async fn generate_fixed_width_question(
        &self,
        exclusions: Vec<String>,
    ) -> Result<SingleQuestionResponse> {
        let request = GenerationRequest::single_question()
            .with_exclusions(exclusions)
            .with_format(ParseFormat::FixedWidth);
        let plan = ContextPlan {
            chunks: 1,
            max_chars: self.retrieval_config.max_fixed_width_single_context_chars,
        };
        let context = self
            .select_context(plan)
            .ok_or_else(|| Error::invalid_input(NO_CONTENT_MESSAGE))?;

        Ok(self.question_from_context(&request, &context).await)
    }

    /// Batch flashcards in the delimited format
    pub async fn generate_flashcards(
        &self,
        request: &GenerationRequest,
    ) -> Result<FlashcardsResponse> {
        self.check_count(request.count)?;
        let plan = ContextPlan {
            chunks: Self::batch_chunks(request.count),
            max_chars: self.retrieval_config.max_batch_context_chars,
        };
        let Some(context) = self.select_context(plan) else {
            return Ok(FlashcardsResponse::failure(NO_CONTENT_MESSAGE));
        };

        let params = PromptParams::from_request(request, self.generation_config.max_exclusions);
        let prompt = PromptBuilder::flashcards_delimited(&params, &context);
        let raw = match self.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => return Ok(FlashcardsResponse::failure(e.to_string())),
        };

        let mut outcome = parse_flashcard_lines(&raw);
        tracing::info!(
            "Parsed {} flashcard(s), dropped {} line(s)",
            outcome.items.len(),
            outcome.diagnostics.len()
        );
        if outcome.is_empty() {
            return Ok(FlashcardsResponse::failure(FLASHCARDS_PARSE_FAILED));
        }
        outcome.items.truncate(request.count);
        Ok(FlashcardsResponse::new(outcome.items))
    }

    /// One flashcard
    pub async fn generate_flashcard(
        &self,
        request: &GenerationRequest,
    ) -> Result<SingleFlashcardResponse> {
        let plan = ContextPlan {
            chunks: 1,
            max_chars: self.retrieval_config.max_single_context_chars,
        };
        let Some(context) = self.select_context(plan) else {
            return Ok(SingleFlashcardResponse::failure(NO_CONTENT_MESSAGE));
        };

        let mut params = PromptParams::from_request(request, self.generation_config.max_exclusions);
        params.count = 1;
        let prompt = PromptBuilder::flashcards_delimited(&params, &context);
        let raw = match self.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => return Ok(SingleFlashcardResponse::failure(e.to_string())),
        };

        Ok(match parse_flashcard_lines(&raw).items.into_iter().next() {
            Some(card) => SingleFlashcardResponse::Flashcard(card),
            None => SingleFlashcardResponse::failure(FLASHCARD_PARSE_FAILED),
        })
    }

    /// Grounded answer to a free-text message
    pub async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let query = message.trim();
        if query.chars().count() < self.generation_config.min_chat_message_chars {
            return Err(Error::invalid_input(format!(
                "Message must be at least {} characters",
                self.generation_config.min_chat_message_chars
            )));
        }

        let reply = |response: &str| ChatResponse {
            response: response.to_string(),
            query: query.to_string(),
        };

        let context = match self
            .retrieval
            .semantic_context(query, self.retrieval_config.chat_top_k)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                tracing::error!("Chat retrieval failed: {}", e);
                return Ok(reply(CHAT_UNAVAILABLE_MESSAGE));
            }
        };

        let context = truncate_chars(&context, self.retrieval_config.max_chat_context_chars);
        if !is_sufficient(context, self.retrieval_config.chat_min_context_chars) {
            return Ok(reply(CHAT_NOT_FOUND_MESSAGE));
        }

        let prompt = PromptBuilder::chat(query, context);
        match self.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => Ok(reply(text.trim())),
            _ => Ok(reply(CHAT_UNAVAILABLE_MESSAGE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_chunk_counts() {
        assert_eq!(Orchestrator::batch_chunks(1), 2);
        assert_eq!(Orchestrator::batch_chunks(5), 2);
        assert_eq!(Orchestrator::batch_chunks(6), 3);
        assert_eq!(Orchestrator::batch_chunks(20), 3);
    }
}
