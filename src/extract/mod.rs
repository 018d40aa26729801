//! PDF text extraction.
//!
//! Turns uploaded PDF documents into one plain-text string: every page of
//! every document, in upload order then page order.

#[cfg(test)]
pub(crate) mod fixtures;
mod pdf;

pub use pdf::extract_pages;

use crate::error::{Result, StudyNotesError};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

/// One uploaded PDF: a display name and its raw bytes.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PdfDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a PDF from disk, named after its file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StudyNotesError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

/// Page count of one extracted document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentStats {
    pub name: String,
    pub pages: usize,
}

/// Concatenated text of a set of documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedText {
    text: String,
    documents: Vec<DocumentStats>,
}

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn documents(&self) -> &[DocumentStats] {
        &self.documents
    }

    pub fn total_pages(&self) -> usize {
        self.documents.iter().map(|d| d.pages).sum()
    }
}

/// Extract and concatenate the text of `documents`, in order.
///
/// Any document that cannot be opened aborts the whole extraction.
#[instrument(skip(documents), fields(count = documents.len()))]
pub fn extract_text(documents: &[PdfDocument]) -> Result<ExtractedText> {
    let mut extracted = ExtractedText::default();

    for document in documents {
        let pages = extract_pages(&document.name, &document.bytes)?;
        info!("Extracted {} page(s) from '{}'", pages.len(), document.name);

        extracted.documents.push(DocumentStats {
            name: document.name.clone(),
            pages: pages.len(),
        });
        for page in pages {
            extracted.text.push_str(&page);
        }
    }

    Ok(extracted)
}

/// Extract the text of a PDF stored at `path`.
pub fn extract_file(path: &Path) -> Result<String> {
    let document = PdfDocument::from_path(path)?;
    Ok(extract_text(std::slice::from_ref(&document))?.into_string())
}
