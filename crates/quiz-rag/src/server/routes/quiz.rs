//! Quiz generation and grading endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::request::{
    parse_exclusions, CheckAnswersRequest, FixedWidthQuizParams, FixedWidthSingleParams,
    QuizParams, SingleQuestionParams,
};
use crate::types::{AnswerCheckSummary, GenerationRequest, QuizResponse, SingleQuestionResponse};

/// POST /api/quiz/generate - Batch quiz, optionally with flashcards
pub async fn generate_quiz(
    State(state): State<AppState>,
    Query(params): Query<QuizParams>,
) -> Result<Json<QuizResponse>> {
    tracing::info!(
        "Quiz request: {} question(s), topic \"{}\", flashcards: {}",
        params.num_questions,
        params.topic,
        params.include_flashcards
    );
    let request = GenerationRequest::from(params);
    Ok(Json(state.orchestrator().generate_quiz(&request).await?))
}

/// POST /api/quiz/generate-one - One question as JSON
pub async fn generate_one(
    State(state): State<AppState>,
    Query(params): Query<SingleQuestionParams>,
) -> Result<Json<SingleQuestionResponse>> {
    let request = GenerationRequest::from(params);
    Ok(Json(state.orchestrator().generate_question(&request).await?))
}

/// POST /api/quiz/agent/generate - Batch quiz in the fixed-width format
pub async fn agent_generate(
    State(state): State<AppState>,
    Query(params): Query<FixedWidthQuizParams>,
) -> Result<Json<QuizResponse>> {
    let response = state
        .orchestrator()
        .generate_fixed_width_quiz(params.num_questions)
        .await?;
    Ok(Json(response))
}

/// POST /api/quiz/agent/generate-one - One question in the fixed-width format
pub async fn agent_generate_one(
    State(state): State<AppState>,
    Query(params): Query<FixedWidthSingleParams>,
) -> Result<Json<SingleQuestionResponse>> {
    let exclusions = parse_exclusions(params.previous_questions.as_deref());
    let response = state
        .orchestrator()
        .generate_fixed_width_question(exclusions)
        .await?;
    Ok(Json(response))
}

/// POST /api/quiz/check-answers - Grade free-text answers
pub async fn check_answers(
    State(state): State<AppState>,
    Json(request): Json<CheckAnswersRequest>,
) -> Json<AnswerCheckSummary> {
    tracing::info!("Checking {} answer(s)", request.answers.len());
    Json(state.checker().check_quiz_answers(&request.answers).await)
}
