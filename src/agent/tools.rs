//! Tool capability interface and the tools the agent exposes to the model.

use crate::error::{Result, StudyNotesError};
use crate::extract::extract_file;
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// A local function the remote model may invoke mid-conversation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool.
    fn name(&self) -> &str;

    /// What the tool does, shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> serde_json::Value;

    /// Run the tool with already-parsed JSON arguments.
    async fn call(&self, arguments: serde_json::Value) -> Result<String>;
}

/// The set of tools registered with an agent.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool already registered under the same name.
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Function definitions for the chat completions request.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.tools
            .iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.name().to_string(),
                    description: Some(tool.description().to_string()),
                    parameters: Some(tool.parameters()),
                    strict: None,
                },
            })
            .collect()
    }

    /// Parse `arguments` and dispatch to the named tool.
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| StudyNotesError::Agent(format!("Unknown tool: {}", name)))?;

        let args: serde_json::Value = if arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(arguments)
                .map_err(|e| StudyNotesError::Agent(format!("Invalid tool arguments: {}", e)))?
        };

        tool.call(args).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Extracts the text of a PDF stored on the local filesystem.
pub struct ExtractPdfText;

#[derive(Debug, Deserialize)]
struct ExtractPdfTextArgs {
    file_path: String,
}

#[async_trait]
impl Tool for ExtractPdfText {
    fn name(&self) -> &str {
        "extract_pdf_text"
    }

    fn description(&self) -> &str {
        "Extract the plain text of every page of a PDF file on disk. \
        Use this when you are given a path to a PDF instead of its text."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the PDF file"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<String> {
        let args: ExtractPdfTextArgs = serde_json::from_value(arguments)
            .map_err(|e| StudyNotesError::Agent(format!("Missing 'file_path' argument: {}", e)))?;
        let path = PathBuf::from(args.file_path);

        tokio::task::spawn_blocking(move || extract_file(&path))
            .await
            .map_err(|e| StudyNotesError::Agent(format!("Extraction task failed: {}", e)))?
    }
}
