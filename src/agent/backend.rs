//! Chat completion transport.

use super::AgentConfig;
use crate::error::{Result, StudyNotesError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateChatCompletionRequest, CreateChatCompletionResponse};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Sends one chat completion request to a model endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: CreateChatCompletionRequest) -> Result<CreateChatCompletionResponse>;
}

/// Backend for any OpenAI-compatible chat completions endpoint.
pub struct OpenAIBackend {
    client: Client<OpenAIConfig>,
}

impl OpenAIBackend {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(&config.base_url, config.api_key(), config.timeout)?,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAIBackend {
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: CreateChatCompletionRequest) -> Result<CreateChatCompletionResponse> {
        debug!("Sending chat completion request");
        self.client
            .chat()
            .create(request)
            .await
            .map_err(|e| StudyNotesError::Remote(format!("Chat completion failed: {}", e)))
    }
}
