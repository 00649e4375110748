//! DOCX text extraction.
//!
//! A DOCX file is a ZIP container; the document body lives in
//! `word/document.xml`. Paragraph text is the concatenation of the
//! `<w:t>` runs inside each `<w:p>` element.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::{ParseError, Result};

fn failure(message: impl ToString) -> ParseError {
    ParseError::ParseFailure {
        format: "DOCX",
        message: message.to_string(),
    }
}

/// Extract text from a DOCX file, one non-blank paragraph per line.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(failure)?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(failure)?
        .read_to_string(&mut xml)
        .map_err(failure)?;

    let mut reader = Reader::from_str(&xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text_run = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if !paragraph.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut paragraph));
                    } else {
                        paragraph.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text_run {
                    let text = e.unescape().map_err(failure)?;
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(failure(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}
