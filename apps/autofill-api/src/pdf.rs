//! PDF text extraction for uploaded documents

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Error)]
pub enum PdfTextError {
    #[error("failed to extract text from PDF: {0}")]
    Extract(#[from] pdf_extract::OutputError),
}

/// Extract and normalize the text of an uploaded PDF.
///
/// Empty uploads yield an empty string; the handler decides whether an empty
/// combined text is an error. Extracted text is NUL-stripped and
/// whitespace-collapsed so page boundaries read as single spaces.
pub fn extract_text(data: &[u8]) -> Result<String, PdfTextError> {
    if data.is_empty() {
        return Ok(String::new());
    }
    let text = pdf_extract::extract_text_from_mem(data)?;
    Ok(normalize(&text))
}

fn normalize(text: &str) -> String {
    let cleaned = text.replace('\u{0}', " ");
    WHITESPACE_RE.replace_all(cleaned.trim(), " ").into_owned()
}
