//! Flashcard generation endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::request::{FlashcardParams, SingleFlashcardParams};
use crate::types::{FlashcardsResponse, GenerationRequest, SingleFlashcardResponse};

/// POST /api/flashcards/generate
pub async fn generate_flashcards(
    State(state): State<AppState>,
    Query(params): Query<FlashcardParams>,
) -> Result<Json<FlashcardsResponse>> {
    let request = GenerationRequest::from(params);
    Ok(Json(state.orchestrator().generate_flashcards(&request).await?))
}

/// POST /api/flashcards/generate-one
pub async fn generate_one(
    State(state): State<AppState>,
    Query(params): Query<SingleFlashcardParams>,
) -> Result<Json<SingleFlashcardResponse>> {
    let request = GenerationRequest::from(params);
    Ok(Json(state.orchestrator().generate_flashcard(&request).await?))
}
