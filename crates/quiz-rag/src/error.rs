//! Error types for the quiz generation pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
///
/// Only `InvalidInput` is meant to reach a caller as-is. Collaborator failures
/// (`Embedding`, `Llm`) are caught by the orchestrator and folded into
/// structured empty-result payloads.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Caller supplied unusable input (bad count, too-short message, no document uploaded)
    #[error("{0}")]
    InvalidInput(String),

    /// Uploaded document could not be turned into text
    #[error("Cannot read document '{filename}': {message}")]
    Document { filename: String, message: String },

    /// Embedding backend failure
    #[error("Embedding backend error: {0}")]
    Embedding(String),

    /// Text generation backend failure
    #[error("Generation backend error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn document(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Document {
            filename: filename.into(),
            message: message.into(),
        }
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the failure originated in an external collaborator
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Llm(_))
    }

    /// Status code and machine-readable type for the HTTP body
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Self::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            Self::Document { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "document_error"),
            Self::Embedding(_) => (StatusCode::SERVICE_UNAVAILABLE, "embedding_error"),
            Self::Llm(_) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Self::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        if self.is_upstream() {
            tracing::warn!("Collaborator unavailable: {}", self);
        } else if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let message = match &self {
            Self::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
