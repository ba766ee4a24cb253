//! PDF text extraction, one unit per page.

use crate::types::{SourceMetadata, TextUnit};
use docqa_core::{AppError, AppResult};
use std::io::Write;
use std::path::Path;

/// Extract the text of every non-blank page of a PDF.
///
/// The bytes are parsed from a temporary file that is removed when this
/// function returns, whether or not parsing succeeded. Pages that fail to
/// decode are skipped; an unreadable document is an error.
pub fn extract_pages(name: &str, bytes: &[u8]) -> AppResult<Vec<TextUnit>> {
    extract_pages_in(&std::env::temp_dir(), name, bytes)
}

fn extract_pages_in(dir: &Path, name: &str, bytes: &[u8]) -> AppResult<Vec<TextUnit>> {
    let mut file = tempfile::Builder::new()
        .prefix("docqa-")
        .suffix(".pdf")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;

    let document = lopdf::Document::load(file.path())
        .map_err(|e| AppError::Load(format!("Failed to parse PDF '{}': {}", name, e)))?;

    let pages = document.get_pages();
    let mut units = Vec::with_capacity(pages.len());

    for &page_number in pages.keys() {
        match document.extract_text(&[page_number]) {
            Ok(text) if text.trim().is_empty() => {
                tracing::debug!("Skipping blank page {} of {}", page_number, name);
            }
            Ok(text) => units.push(TextUnit::new(
                text,
                SourceMetadata::pdf_page(name, page_number),
            )),
            Err(e) => {
                tracing::warn!("Failed to extract page {} of {}: {}", page_number, name, e);
            }
        }
    }

    tracing::debug!("Extracted {} of {} pages from {}", units.len(), pages.len(), name);
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::pdf_with_pages;

    #[test]
    fn test_one_unit_per_page() {
        let bytes = pdf_with_pages(&["Introduction to tides", "", "Lunar influence"]);
        let units = extract_pages("tides.pdf", &bytes).unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].metadata, SourceMetadata::pdf_page("tides.pdf", 1));
        assert!(units[0].content.contains("Introduction to tides"));
        assert_eq!(units[1].metadata.page, Some(3));
        assert!(units[1].content.contains("Lunar influence"));
    }

    #[test]
    fn test_invalid_pdf_is_load_error() {
        let err = extract_pages("broken.pdf", b"not a pdf at all").unwrap_err();
        assert!(matches!(err, AppError::Load(_)));
    }

    #[test]
    fn test_temporary_file_is_removed() {
        let dir = tempfile::TempDir::new().unwrap();

        assert!(extract_pages_in(dir.path(), "broken.pdf", b"not a pdf").is_err());
        assert!(extract_pages_in(dir.path(), "ok.pdf", &pdf_with_pages(&["text"])).is_ok());

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
