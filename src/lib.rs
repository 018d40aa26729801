//! studynotes - Study Notes Summarizer & Quiz Generator
//!
//! Extracts the text of uploaded PDF study notes and asks a language model,
//! through an OpenAI-compatible endpoint, for a concise bullet-point summary
//! or a 5-question multiple-choice quiz.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `extract` - PDF text extraction
//! - `agent` - Chat backend, tool registry and the shared agent
//! - `orchestrator` - Prompt construction for the two tasks
//! - `session` - Uploaded text and the latest results
//! - `cli` - Command line and the local web app
//!
//! # Example
//!
//! ```rust,no_run
//! use studynotes::agent::shared_agent;
//! use studynotes::config::{Prompts, Settings};
//! use studynotes::extract::{extract_text, PdfDocument};
//! use studynotes::orchestrator::{Orchestrator, Task};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let notes = PdfDocument::from_path(std::path::Path::new("notes.pdf"))?;
//!     let text = extract_text(&[notes])?;
//!
//!     let orchestrator = Orchestrator::new(shared_agent(&settings)?, Prompts::default());
//!     println!("{}", orchestrator.run(Task::Summary, text.as_str()).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod openai;
pub mod orchestrator;
pub mod session;

pub use error::{Result, StudyNotesError};
