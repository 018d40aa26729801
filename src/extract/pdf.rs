//! Page-level PDF text extraction backed by `lopdf`.

use crate::error::{Result, StudyNotesError};
use lopdf::Document;
use std::fmt::Display;
use tracing::debug;

/// Open `bytes` as a PDF and return the text of every page, in page order.
///
/// Fails only when the document as a whole cannot be opened. A page whose
/// text cannot be extracted yields an empty string.
pub fn extract_pages(name: &str, bytes: &[u8]) -> Result<Vec<String>> {
    let doc = Document::load_mem(bytes).map_err(|e| StudyNotesError::document_parse(name, e))?;

    // get_pages is keyed by 1-based page number, so iteration is in page order.
    let pages = doc
        .get_pages()
        .into_keys()
        .map(|page_number| page_or_empty(name, page_number, doc.extract_text(&[page_number])))
        .collect();

    Ok(pages)
}

/// Collapse a page extraction result into its text, substituting `""` on failure.
fn page_or_empty<E: Display>(name: &str, page_number: u32, result: std::result::Result<String, E>) -> String {
    match result {
        Ok(text) => text.trim_end_matches(['\r', '\n']).to_string(),
        Err(e) => {
            debug!("No text extracted from page {} of '{}': {}", page_number, name, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures::{pdf_with_pages, PageContent};

    #[test]
    fn test_single_page_sentence() {
        let pdf = pdf_with_pages(&[PageContent::Text(
            "Photosynthesis converts light to chemical energy.",
        )]);
        let pages = extract_pages("bio.pdf", &pdf).unwrap();
        assert_eq!(pages, vec!["Photosynthesis converts light to chemical energy."]);
    }

    #[test]
    fn test_pages_in_order() {
        let pdf = pdf_with_pages(&[
            PageContent::Text("Chapter one."),
            PageContent::Text("Chapter two."),
            PageContent::Text("Chapter three."),
        ]);
        let pages = extract_pages("book.pdf", &pdf).unwrap();
        assert_eq!(pages, vec!["Chapter one.", "Chapter two.", "Chapter three."]);
    }

    #[test]
    fn test_page_without_text_is_empty() {
        let pdf = pdf_with_pages(&[
            PageContent::Text("Before the figure."),
            PageContent::Graphics,
            PageContent::Text("After the figure."),
        ]);
        let pages = extract_pages("figures.pdf", &pdf).unwrap();
        assert_eq!(pages, vec!["Before the figure.", "", "After the figure."]);
    }

    #[test]
    fn test_zero_pages() {
        let pdf = pdf_with_pages(&[]);
        let pages = extract_pages("empty.pdf", &pdf).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn test_unreadable_document_fails() {
        let err = extract_pages("broken.pdf", b"this is not a pdf").unwrap_err();
        match err {
            StudyNotesError::DocumentParse { name, .. } => assert_eq!(name, "broken.pdf"),
            other => panic!("Expected DocumentParse, got {:?}", other),
        }
    }

    #[test]
    fn test_page_failure_is_silent() {
        let failed: std::result::Result<String, &str> = Err("unsupported font encoding");
        assert_eq!(page_or_empty("scan.pdf", 4, failed), "");

        let ok: std::result::Result<String, &str> = Ok("Cell walls.\n".to_string());
        assert_eq!(page_or_empty("scan.pdf", 5, ok), "Cell walls.");
    }
}
