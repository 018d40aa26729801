//! Configuration module for studynotes.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::Prompts;
pub use settings::{GeneralSettings, ModelSettings, PromptSettings, ServerSettings, Settings};
