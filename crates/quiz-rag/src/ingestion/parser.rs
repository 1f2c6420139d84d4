//! PDF text extraction

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// Seconds to wait for `pdf-extract` before falling back to lopdf
const EXTRACT_TIMEOUT_SECS: u64 = 60;

/// Extracts plain text from uploaded PDF bytes
pub struct PdfParser;

impl PdfParser {
    /// Whether the payload looks like a PDF (magic bytes, not the filename)
    pub fn is_pdf(data: &[u8]) -> bool {
        data.len() > 5 && data.starts_with(b"%PDF-")
    }

    /// Extract cleaned text. Errors when the payload is not a PDF or yields no text.
    pub fn extract_text(filename: &str, data: &[u8]) -> Result<String> {
        if !Self::is_pdf(data) {
            return Err(Error::document(filename, "Not a PDF document"));
        }

        let raw = Self::extract_raw(filename, data)?;
        let content = cleanup_text(&raw);

        if content.trim().is_empty() {
            return Err(Error::document(
                filename,
                "No text content could be extracted from PDF",
            ));
        }

        Ok(content)
    }

    /// `pdf-extract` first, lopdf pages when it errors, hangs or panics
    fn extract_raw(filename: &str, data: &[u8]) -> Result<String> {
        match run_pdf_extract(data) {
            Ok(text) => Ok(text),
            Err(reason) => {
                tracing::warn!("pdf-extract unusable for {} ({}), reading pages", filename, reason);
                Self::extract_pages(filename, data)
            }
        }
    }

    /// Page-by-page extraction with lopdf
    fn extract_pages(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::document(filename, format!("Failed to load PDF: {}", e)))?;

        let mut all_text = String::new();
        for (page_num, _) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(text) if !text.trim().is_empty() => {
                    all_text.push_str(&text);
                    all_text.push('\n');
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("No text on page {}: {}", page_num, e),
            }
        }

        if all_text.trim().is_empty() {
            return Err(Error::document(
                filename,
                "PDF appears to be image-based or has no extractable text",
            ));
        }

        Ok(all_text)
    }
}

/// `pdf-extract` on a detached worker, bounded by [`EXTRACT_TIMEOUT_SECS`]
fn run_pdf_extract(data: &[u8]) -> std::result::Result<String, String> {
    let bytes = data.to_vec();
    let (tx, rx) = mpsc::sync_channel(1);

    thread::spawn(move || {
        let _ = tx.send(pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string()));
    });

    match rx.recv_timeout(Duration::from_secs(EXTRACT_TIMEOUT_SECS)) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(format!("timed out after {}s", EXTRACT_TIMEOUT_SECS))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err("worker panicked".to_string()),
    }
}

/// Normalize extracted text: strip NULs, fold ligatures and typographic
/// punctuation, trim lines and drop blank ones.
fn cleanup_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{00A0}', " ")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
