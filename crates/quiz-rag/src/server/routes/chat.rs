//! Document chat endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::request::ChatRequest;
use crate::types::ChatResponse;

/// POST /api/chat - Answer a question from the uploaded document
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    tracing::info!("Chat: \"{}\"", request.message);
    Ok(Json(state.orchestrator().chat(&request.message).await?))
}
