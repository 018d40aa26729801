//! Per-user study session: the uploaded text and the latest results.
//!
//! Backs both the CLI and the HTTP server. Uploading replaces the extracted
//! text; each task writes only its own result slot, and only on success.

use crate::error::{Result, StudyNotesError};
use crate::extract::{extract_text, DocumentStats, ExtractedText, PdfDocument};
use crate::orchestrator::{Orchestrator, Task};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Shown once at least one file has been uploaded.
pub const UPLOAD_SUCCESS: &str = "File(s) uploaded successfully!";

/// Outcome of an upload event.
#[derive(Debug, Clone, Serialize)]
pub struct UploadStatus {
    pub files: usize,
    pub pages: usize,
    pub characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// A generated summary or quiz.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedResult {
    pub task: Task,
    pub output: String,
    /// True when the model returned no final text and the raw response is shown.
    pub degraded: bool,
    pub generated_at: DateTime<Utc>,
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub documents: Vec<DocumentStats>,
    pub characters: usize,
    pub summary: Option<GeneratedResult>,
    pub quiz: Option<GeneratedResult>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct StudySession {
    text: ExtractedText,
    summary: Option<GeneratedResult>,
    quiz: Option<GeneratedResult>,
    uploaded_at: Option<DateTime<Utc>>,
}

impl StudySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session's documents and extract their text eagerly.
    ///
    /// On a parse error the previous documents and results are kept.
    pub fn upload(&mut self, documents: &[PdfDocument]) -> Result<UploadStatus> {
        let text = extract_text(documents)?;
        Ok(self.replace_text(documents.len(), text))
    }

    /// Store text already extracted from `files` documents.
    ///
    /// Clears both results, since they describe the previous text.
    pub fn replace_text(&mut self, files: usize, text: ExtractedText) -> UploadStatus {
        let status = UploadStatus {
            files,
            pages: text.total_pages(),
            characters: text.as_str().chars().count(),
            message: (files > 0).then_some(UPLOAD_SUCCESS),
        };
        info!(
            "Uploaded {} file(s), {} page(s), {} characters",
            status.files, status.pages, status.characters
        );

        self.text = text;
        self.summary = None;
        self.quiz = None;
        self.uploaded_at = Some(Utc::now());
        status
    }

    pub fn has_documents(&self) -> bool {
        !self.text.documents().is_empty()
    }

    pub fn text(&self) -> &ExtractedText {
        &self.text
    }

    /// Latest result for `task`, if any.
    pub fn result(&self, task: Task) -> Option<&GeneratedResult> {
        match task {
            Task::Summary => self.summary.as_ref(),
            Task::Quiz => self.quiz.as_ref(),
        }
    }

    /// Run `task` over the uploaded text and store the result in its slot.
    ///
    /// Errors leave every existing result untouched.
    pub async fn generate(&mut self, task: Task, orchestrator: &Orchestrator) -> Result<&GeneratedResult> {
        if !self.has_documents() {
            return Err(StudyNotesError::InvalidInput(
                "Upload at least one PDF first".to_string(),
            ));
        }

        let run = match orchestrator.run_detailed(task, self.text.as_str()).await {
            Ok(run) => run,
            Err(e) => {
                warn!("{} request failed: {}", task, e);
                return Err(e);
            }
        };

        let result = GeneratedResult {
            task,
            degraded: run.is_degraded(),
            output: run.output(),
            generated_at: Utc::now(),
        };

        let slot = match task {
            Task::Summary => &mut self.summary,
            Task::Quiz => &mut self.quiz,
        };
        let stored: &GeneratedResult = slot.insert(result);
        Ok(stored)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            documents: self.text.documents().to_vec(),
            characters: self.text.as_str().chars().count(),
            summary: self.summary.clone(),
            quiz: self.quiz.clone(),
            uploaded_at: self.uploaded_at,
        }
    }
}
