//! Content Extractor — plain text out of uploaded Word and PDF files.
//!
//! Extraction never fails from the caller's point of view: problems come back
//! as a one-line diagnostic (`Error reading Word file: ...`) that is used in
//! place of the document text.

use std::io::{Cursor, Read};
use std::panic;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

const DOCUMENT_PART: &str = "word/document.xml";

/// Prefix of every diagnostic returned in place of document text.
pub const DIAGNOSTIC_PREFIX: &str = "Error reading";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Word,
    Pdf,
}

impl DocumentKind {
    /// Picks the reader by extension. Anything but `.docx` and `.pdf` is unsupported.
    pub fn from_filename(name: &str) -> Option<DocumentKind> {
        let name = name.trim().to_ascii_lowercase();
        if name.ends_with(".docx") {
            Some(DocumentKind::Word)
        } else if name.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            DocumentKind::Word => "Word",
            DocumentKind::Pdf => "PDF",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a valid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    Pdf(String),
}

/// Returns the document text, or a diagnostic line when it cannot be read.
pub fn extract(bytes: &[u8], kind: DocumentKind) -> String {
    let result = match kind {
        DocumentKind::Word => read_docx(bytes),
        DocumentKind::Pdf => read_pdf(bytes),
    };
    result.unwrap_or_else(|e| format!("{DIAGNOSTIC_PREFIX} {} file: {e}", kind.label()))
}

/// True when `text` is an extraction diagnostic rather than document content.
pub fn is_diagnostic(text: &str) -> bool {
    text.starts_with(DIAGNOSTIC_PREFIX)
}

/// One line per paragraph, in document order. Empty paragraphs are kept.
pub fn read_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;
    // Tab stops declared in paragraph properties are not content.
    let mut in_properties = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"pPr" => in_properties = true,
                b"t" => in_text = true,
                b"tab" if !in_properties => current.push('\t'),
                b"br" => current.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if !in_properties => current.push('\t'),
                b"br" => current.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"p" if in_paragraph => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                }
                b"pPr" => in_properties = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Text of every page, as laid out by `pdf-extract`.
pub fn read_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("the PDF could not be parsed".to_string())),
    }
}
