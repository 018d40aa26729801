//! Request orchestrator for studynotes.
//!
//! Turns the current extracted text into a task prompt, runs it through the
//! shared agent and hands back the text to display.

use crate::agent::{Agent, RunResult};
use crate::config::Prompts;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What the user asked the agent to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Concise bullet-point summary.
    Summary,
    /// Five-question multiple-choice quiz.
    Quiz,
}

impl std::str::FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" | "summarize" => Ok(Task::Summary),
            "quiz" => Ok(Task::Quiz),
            _ => Err(format!("Unknown task: {}", s)),
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Summary => write!(f, "summary"),
            Task::Quiz => write!(f, "quiz"),
        }
    }
}

/// Build the prompt for `task` over `text`.
pub fn build_prompt(task: Task, text: &str, prompts: &Prompts) -> String {
    let template = match task {
        Task::Summary => &prompts.summary,
        Task::Quiz => &prompts.quiz,
    };
    prompts.render_with_text(template, text)
}

/// Runs summary and quiz requests against one agent.
pub struct Orchestrator {
    agent: Arc<Agent>,
    prompts: Prompts,
}

impl Orchestrator {
    pub fn new(agent: Arc<Agent>, prompts: Prompts) -> Self {
        Self { agent, prompts }
    }

    /// Run `task` over `text` and return the text to display.
    ///
    /// Remote failures are returned to the caller untouched.
    #[instrument(skip(self, text), fields(task = %task, text_len = text.len()))]
    pub async fn run(&self, task: Task, text: &str) -> Result<String> {
        Ok(self.run_detailed(task, text).await?.output())
    }

    /// Like [`Orchestrator::run`], but returns the whole run result.
    pub async fn run_detailed(&self, task: Task, text: &str) -> Result<RunResult> {
        if text.trim().is_empty() {
            warn!("Requesting {} over empty text", task);
        }

        let prompt = build_prompt(task, text, &self.prompts);
        info!("Requesting {} ({} prompt chars)", task, prompt.len());

        let result = self.agent.run(&prompt).await?;
        if result.is_degraded() {
            warn!("{} response had no final output, showing raw response", task);
        }
        Ok(result)
    }
}
