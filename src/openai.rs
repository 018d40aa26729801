//! OpenAI-compatible client configuration with sensible defaults.

use crate::error::{Result, StudyNotesError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for chat completion requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for an OpenAI-compatible endpoint with a custom timeout.
///
/// Only builds configuration; no request is sent.
pub fn create_client(api_base: &str, api_key: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| StudyNotesError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
