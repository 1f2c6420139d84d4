//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::PdfParser;
use crate::server::state::AppState;
use crate::types::IngestResponse;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

/// POST /api/quiz/upload-pdf - Replace the stored document
///
/// Anything that is not a readable PDF clears the store and reports
/// `chunks_count = 0` instead of failing.
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_input(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::invalid_input(format!("Failed to read file: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| Error::invalid_input("Missing multipart field 'file'"))?;

    tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

    let parse_name = filename.clone();
    let text = tokio::task::spawn_blocking(move || PdfParser::extract_text(&parse_name, &data))
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
        .unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            String::new()
        });

    let chunks_count = state.store().ingest(&text).await?;

    let message = if chunks_count > 0 {
        "PDF processed and stored successfully".to_string()
    } else {
        format!("No text could be extracted from '{}'; nothing is stored", filename)
    };

    tracing::info!(
        "Ingested {} into {} chunks in {}ms",
        filename,
        chunks_count,
        start.elapsed().as_millis()
    );

    Ok(Json(IngestResponse {
        message,
        chunks_count,
    }))
}
