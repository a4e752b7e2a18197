//! Text extraction from uploaded PDF study material.

use pdf::file::FileOptions;
use thiserror::Error;
use tracing::info;

/// Substituted for the document text when extraction fails. The document is
/// still stored so the student can retry or delete it.
pub const EXTRACTION_FAILED_TEXT: &str =
    "Text extraction failed. Please ensure the PDF is readable.";

const PREVIEW_CHAR_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),
    #[error("PDF contains no extractable text")]
    NoText,
}

/// The extraction result persisted alongside an uploaded document.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub full_text: String,
    pub preview: String,
    pub word_count: i64,
}

/// Extracts the raw text content from PDF bytes by walking every page's
/// `TextDraw` operations.
pub fn extract_text(pdf_data: &[u8]) -> Result<ExtractedText, PdfError> {
    let file = FileOptions::cached()
        .load(pdf_data)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    let resolver = file.resolver();
    let mut full_text = String::new();

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| PdfError::Parse(e.to_string()))?;
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| PdfError::Parse(e.to_string()))?;
            for op in operations.iter() {
                if let pdf::content::Op::TextDraw { text } = op {
                    full_text.push_str(&text.to_string_lossy());
                    full_text.push(' ');
                }
            }
        }
    }

    let full_text = full_text.split_whitespace().collect::<Vec<_>>().join(" ");
    if full_text.is_empty() {
        return Err(PdfError::NoText);
    }

    let word_count = full_text.split_whitespace().count() as i64;
    info!(word_count, "Extracted text from PDF");
    Ok(ExtractedText {
        preview: full_text.chars().take(PREVIEW_CHAR_LIMIT).collect(),
        word_count,
        full_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_rejects_garbage() {
        let result = extract_text(b"this is not a pdf at all");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_extraction_failed_text_fits_preview() {
        assert!(EXTRACTION_FAILED_TEXT.len() <= PREVIEW_CHAR_LIMIT);
    }
}
