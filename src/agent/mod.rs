//! Agent system for study-notes tasks with tool calling.
//!
//! Provides a single configured LLM agent, built once per process, that can
//! call back into local tools (PDF text extraction) while it answers.

mod backend;
mod factory;
mod runner;
#[cfg(test)]
pub(crate) mod testing;
mod tools;

pub use backend::{ChatBackend, OpenAIBackend};
pub use factory::{shared_agent, validate_api_key, validate_base_url, AgentConfig, AgentFactory};
pub use runner::{Agent, RunResult, ToolCallRecord};
pub use tools::{ExtractPdfText, Tool, ToolRegistry};
