//! PDF text extraction, page by page.

use lopdf::Document;

use super::{ParseError, Result};

/// Pages whose extracted text is this short or shorter are treated as
/// noise (bare page numbers, decorations) and skipped.
const MIN_PAGE_CHARS: usize = 10;

/// Extract text from a PDF, labelling each surviving page.
///
/// Pages are processed in order; interior whitespace is collapsed per
/// page. A page that fails to decode is skipped rather than failing the
/// whole document. If no page yields usable text the document is empty.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let doc = Document::load_mem(data).map_err(|e| ParseError::ParseFailure {
        format: "PDF",
        message: e.to_string(),
    })?;

    let pages = doc.get_pages();
    log::info!("PDF has {} pages", pages.len());

    let mut text = String::new();

    for &page_num in pages.keys() {
        let page_text = match doc.extract_text(&[page_num]) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Error extracting page {}: {}", page_num, e);
                continue;
            }
        };

        // Normalize whitespace but preserve the content itself
        let normalized = page_text.split_whitespace().collect::<Vec<_>>().join(" ");

        if normalized.chars().count() > MIN_PAGE_CHARS {
            text.push_str(&format!("Page {}:\n{}\n\n", page_num, normalized));
        } else if normalized.is_empty() {
            log::warn!("Page {}: no text extracted", page_num);
        } else {
            log::warn!("Page {}: insufficient content '{}'", page_num, normalized);
        }
    }

    if text.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    log::info!("PDF extraction complete: {} characters", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pdf_is_parse_failure() {
        let err = extract_text(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, ParseError::ParseFailure { format: "PDF", .. }));
    }
}
