//! Scripted chat backend and canned responses for tests.

use super::backend::ChatBackend;
use crate::error::{Result, StudyNotesError};
use async_openai::types::{CreateChatCompletionRequest, CreateChatCompletionResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses in order and records every request as JSON.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<CreateChatCompletionResponse>>>,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<CreateChatCompletionResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Content of the user message of the `index`-th request.
    pub fn user_prompt(&self, index: usize) -> String {
        let requests = self.requests();
        requests[index]["messages"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["role"] == "user")
            .and_then(|m| m["content"].as_str())
            .unwrap()
            .to_string()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: CreateChatCompletionRequest) -> Result<CreateChatCompletionResponse> {
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(&request).unwrap());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StudyNotesError::Remote("script exhausted".to_string())))
    }
}

fn response(message: serde_json::Value, finish_reason: &str) -> CreateChatCompletionResponse {
    serde_json::from_value(serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gemini-2.5-flash",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason
        }]
    }))
    .unwrap()
}

/// A final answer carrying `content`.
pub fn text_response(content: &str) -> CreateChatCompletionResponse {
    response(
        serde_json::json!({ "role": "assistant", "content": content }),
        "stop",
    )
}

/// A response with no text and no tool calls.
pub fn empty_response() -> CreateChatCompletionResponse {
    response(serde_json::json!({ "role": "assistant" }), "stop")
}

/// A response requesting one tool call.
pub fn tool_call_response(id: &str, name: &str, arguments: &str) -> CreateChatCompletionResponse {
    response(
        serde_json::json!({
            "role": "assistant",
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            }]
        }),
        "tool_calls",
    )
}
