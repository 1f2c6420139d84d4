//! API routes for the quiz server

pub mod chat;
pub mod flashcards;
pub mod ingest;
pub mod quiz;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for PDFs
        .route(
            "/quiz/upload-pdf",
            post(ingest::upload_pdf).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Quiz generation
        .route("/quiz/generate", post(quiz::generate_quiz))
        .route("/quiz/generate-one", post(quiz::generate_one))
        // Fixed-width generation
        .route("/quiz/agent/generate", post(quiz::agent_generate))
        .route("/quiz/agent/generate-one", post(quiz::agent_generate_one))
        // Grading
        .route("/quiz/check-answers", post(quiz::check_answers))
        // Flashcards
        .route("/flashcards/generate", post(flashcards::generate_flashcards))
        .route("/flashcards/generate-one", post(flashcards::generate_one))
        // Chat
        .route("/chat", post(chat::chat))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "quiz-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Quizzes, flashcards and chat generated from an uploaded document",
        "endpoints": {
            "POST /api/quiz/upload-pdf": "Upload a PDF, replacing the current document",
            "POST /api/quiz/generate": "Generate a quiz (optionally with flashcards)",
            "POST /api/quiz/generate-one": "Generate one question",
            "POST /api/quiz/agent/generate": "Generate a quiz in the fixed-width format",
            "POST /api/quiz/agent/generate-one": "Generate one fixed-width question",
            "POST /api/quiz/check-answers": "Grade free-text answers",
            "POST /api/flashcards/generate": "Generate flashcards",
            "POST /api/flashcards/generate-one": "Generate one flashcard",
            "POST /api/chat": "Ask a question about the document"
        }
    }))
}
