//! Summary and quiz command implementation.

use super::extract::load_documents;
use crate::agent::shared_agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::orchestrator::{Orchestrator, Task};
use crate::session::StudySession;
use anyhow::Result;
use std::path::PathBuf;

/// Run the summary or quiz command over `files`.
pub async fn run_generate(task: Task, files: &[PathBuf], settings: &Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Generate, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'studynotes doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let documents = load_documents(files)?;
    let mut session = StudySession::new();
    let status = match session.upload(&documents) {
        Ok(status) => status,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    if let Some(message) = status.message {
        Output::success(message);
    }
    for doc in session.text().documents() {
        Output::document(&doc.name, doc.pages);
    }
    if session.text().is_empty() {
        Output::warning("No text could be extracted; the model will see an empty document.");
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let orchestrator = Orchestrator::new(shared_agent(settings)?, prompts);

    let (busy, heading) = match task {
        Task::Summary => ("Generating summary...", "Summary"),
        Task::Quiz => ("Generating quiz...", "Quiz"),
    };
    let spinner = Output::spinner(busy);

    match session.generate(task, &orchestrator).await {
        Ok(result) => {
            spinner.finish_and_clear();
            Output::header(heading);
            println!("\n{}\n", result.output);
            if result.degraded {
                Output::warning("The model returned no final answer; showing the raw response.");
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate {}: {}", task, e));
            return Err(e.into());
        }
    }

    Ok(())
}
