//! Extract command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{content_preview, Output};
use crate::config::Settings;
use crate::extract::{extract_text, PdfDocument};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Read every path as a PDF document, in order.
pub fn load_documents(files: &[PathBuf]) -> crate::error::Result<Vec<PdfDocument>> {
    files.iter().map(|path| PdfDocument::from_path(path)).collect()
}

/// Run the extract command.
pub fn run_extract(files: &[PathBuf], output: Option<&Path>, settings: &Settings) -> Result<()> {
    preflight::check(Operation::Extract, settings)?;

    let documents = load_documents(files)?;
    let extracted = match extract_text(&documents) {
        Ok(extracted) => extracted,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, extracted.as_str())?;
            Output::success(&format!("Wrote extracted text to {}", path.display()));
            for doc in extracted.documents() {
                Output::document(&doc.name, doc.pages);
            }
            Output::kv("Characters", &extracted.as_str().chars().count().to_string());
            Output::kv("Preview", &content_preview(extracted.as_str(), 120));
        }
        None => println!("{}", extracted.as_str()),
    }

    Ok(())
}
