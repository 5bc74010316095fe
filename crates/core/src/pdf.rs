//! PDF to Markdown conversion.
//!
//! The pipeline hands the raw response bytes to a [`PdfConverter`] and
//! returns whatever it produces unchanged. The default implementation keeps
//! the text layer of the document, one paragraph per block of lines.

use crate::{PagedownError, Result};

/// Turns the bytes of a PDF document into Markdown.
///
/// Failures propagate to the caller of the conversion as-is.
pub trait PdfConverter: Send + Sync {
    fn convert(&self, bytes: &[u8]) -> Result<String>;
}

/// Default [`PdfConverter`] backed by `pdf-extract`.
///
/// Without the `pdf` feature every conversion fails with
/// [`PagedownError::Pdf`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractConverter;

impl PdfConverter for PdfExtractConverter {
    fn convert(&self, bytes: &[u8]) -> Result<String> {
        let text = extract_text(bytes)?;
        let cleaned = clean_text(&text);

        if cleaned.is_empty() {
            return Err(PagedownError::Pdf("PDF contains no extractable text (may be image-only)".to_string()));
        }

        Ok(cleaned)
    }
}

#[cfg(feature = "pdf")]
fn extract_text(bytes: &[u8]) -> Result<String> {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    // pdf-extract panics on some malformed documents instead of erroring.
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(result) => result.map_err(|e| PagedownError::Pdf(e.to_string())),
        Err(_) => Err(PagedownError::Pdf("malformed PDF document".to_string())),
    }
}

#[cfg(not(feature = "pdf"))]
fn extract_text(_bytes: &[u8]) -> Result<String> {
    Err(PagedownError::Pdf("PDF support not enabled (build with the `pdf` feature)".to_string()))
}

/// Clean up common PDF extraction artifacts
///
/// Lines are trimmed and runs of empty lines become a single paragraph
/// break.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .fold(Vec::new(), |mut acc: Vec<&str>, line| {
            if !line.is_empty() || acc.last().is_some_and(|last| !last.is_empty()) {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        let dirty = "  Line 1  \n\n\n  Line 2  \n  \n  Line 3  ";
        assert_eq!(clean_text(dirty), "Line 1\n\nLine 2\n\nLine 3");
    }

    #[test]
    fn test_clean_text_leading_blank_lines() {
        assert_eq!(clean_text("\n\n  \nTitle\nBody\n\n"), "Title\nBody");
    }

    #[test]
    fn test_garbage_bytes_are_a_pdf_error() {
        let result = PdfExtractConverter.convert(b"definitely not a pdf");
        assert!(matches!(result, Err(PagedownError::Pdf(_))));
    }
}
