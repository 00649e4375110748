//! Document parsing: raw file bytes to a single plain-text string.

mod docx;
mod pdf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("{format} parsing error: {message}")]
    ParseFailure {
        format: &'static str,
        message: String,
    },

    #[error("Document contains no extractable text")]
    EmptyDocument,
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse raw file bytes into plain text based on the file extension.
///
/// The extension is matched case-insensitively, with or without a leading
/// dot. Whitespace-only output is reported as `EmptyDocument`.
pub fn parse(data: &[u8], extension: &str) -> Result<String> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();

    let text = match ext.as_str() {
        "pdf" => pdf::extract_text(data)?,
        "docx" => docx::extract_text(data)?,
        "txt" => parse_txt(data)?,
        _ => return Err(ParseError::UnsupportedFormat(format!(".{}", ext))),
    };

    if text.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    Ok(text)
}

/// Decode a TXT file as UTF-8, with no further normalization.
fn parse_txt(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec()).map_err(|e| ParseError::ParseFailure {
        format: "TXT",
        message: e.to_string(),
    })
}
