//! Agent runner with tool calling loop.

use super::backend::ChatBackend;
use super::tools::ToolRegistry;
use crate::error::{Result, StudyNotesError};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Default iteration bound for a single run.
const DEFAULT_MAX_ITERATIONS: usize = 10;

/// A configured conversational agent: model, instructions and tools.
///
/// Read-only once built; share it behind an `Arc`.
pub struct Agent {
    name: String,
    model: String,
    instructions: String,
    backend: Arc<dyn ChatBackend>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent for `model` with no instructions and no tools.
    pub fn new(backend: Arc<dyn ChatBackend>, model: &str) -> Self {
        Self {
            name: "assistant".to_string(),
            model: model.to_string(),
            instructions: String::new(),
            backend,
            tools: ToolRegistry::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the system instructions.
    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = instructions.to_string();
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run a single-turn conversation with `input` as the user message.
    ///
    /// Tool calls requested by the model are executed and fed back until the
    /// model answers without requesting more tools.
    #[instrument(skip(self, input), fields(agent = %self.name, input_len = input.len()))]
    pub async fn run(&self, input: &str) -> Result<RunResult> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if !self.instructions.is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.instructions.clone())
                    .build()
                    .map_err(|e| StudyNotesError::Agent(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(input.to_string())
                .build()
                .map_err(|e| StudyNotesError::Agent(e.to_string()))?
                .into(),
        );

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(StudyNotesError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request.model(&self.model).messages(messages.clone());
            if !self.tools.is_empty() {
                request.tools(self.tools.definitions());
            }
            let request = request
                .build()
                .map_err(|e| StudyNotesError::Agent(e.to_string()))?;

            let response = self.backend.complete(request).await?;

            let tool_calls = response
                .choices
                .first()
                .and_then(|choice| choice.message.tool_calls.clone())
                .unwrap_or_default();

            if tool_calls.is_empty() {
                return Ok(RunResult::from_response(&response, tool_calls_made, iterations));
            }

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| StudyNotesError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in &tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| StudyNotesError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Failures are reported back to the model as the tool's output.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match self.tools.execute(name, arguments).await {
            Ok(output) => output,
            Err(e) => format!("Tool error: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.tools)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Outcome of an agent run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Text of the model's final answer, when the response carried one.
    pub final_output: Option<String>,
    /// Debug rendering of the last response received.
    pub raw_response: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (model calls) used.
    pub iterations: usize,
}

impl RunResult {
    fn from_response(
        response: &CreateChatCompletionResponse,
        tool_calls: Vec<ToolCallRecord>,
        iterations: usize,
    ) -> Self {
        let final_output = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone());

        Self {
            final_output,
            raw_response: format!("{:?}", response),
            tool_calls,
            iterations,
        }
    }

    /// Text to display: the final output, or the raw response when there is none.
    pub fn output(&self) -> String {
        match &self.final_output {
            Some(text) => text.clone(),
            None => self.raw_response.clone(),
        }
    }

    /// Whether the run ended without a final text answer.
    pub fn is_degraded(&self) -> bool {
        self.final_output.is_none()
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{empty_response, text_response, tool_call_response, ScriptedBackend};
    use crate::agent::tools::ExtractPdfText;
    use crate::extract::fixtures::pdf_with_text;

    fn agent(backend: Arc<ScriptedBackend>) -> Agent {
        Agent::new(backend, "gemini-2.5-flash")
            .with_name("StudyNotesAssistant")
            .with_instructions("You are a Study Notes Assistant.")
            .with_tools(ToolRegistry::new().register(Arc::new(ExtractPdfText)))
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "extract_pdf_text".to_string(),
            arguments: r#"{"file_path": "notes.pdf"}"#.to_string(),
            result: "Some text".to_string(),
        };
        assert_eq!(format!("{}", record), r#"extract_pdf_text({"file_path": "notes.pdf"})"#);
    }

    #[tokio::test]
    async fn test_single_turn_final_output() {
        let backend = ScriptedBackend::new(vec![Ok(text_response("- A bullet"))]);
        let result = agent(backend.clone()).run("Summarize: cells").await.unwrap();

        assert_eq!(result.final_output.as_deref(), Some("- A bullet"));
        assert_eq!(result.output(), "- A bullet");
        assert_eq!(result.iterations, 1);
        assert!(result.tool_calls.is_empty());

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["model"], "gemini-2.5-flash");
        assert_eq!(requests[0]["messages"][0]["role"], "system");
        assert_eq!(requests[0]["messages"][0]["content"], "You are a Study Notes Assistant.");
        assert_eq!(requests[0]["messages"][1]["role"], "user");
        assert_eq!(requests[0]["messages"][1]["content"], "Summarize: cells");
        assert_eq!(requests[0]["tools"][0]["function"]["name"], "extract_pdf_text");
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chem.pdf");
        std::fs::write(&path, pdf_with_text("Water is polar.")).unwrap();
        let arguments = serde_json::json!({ "file_path": path }).to_string();

        let backend = ScriptedBackend::new(vec![
            Ok(tool_call_response("call_1", "extract_pdf_text", &arguments)),
            Ok(text_response("- Water is polar.")),
        ]);
        let result = agent(backend.clone()).run("Summarize the file").await.unwrap();

        assert_eq!(result.output(), "- Water is polar.");
        assert_eq!(result.iterations, 2);
        assert_eq!(result.tool_calls.len(), 1);
        assert_eq!(result.tool_calls[0].result, "Water is polar.");

        let second = &backend.requests()[1];
        let messages = second["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call_1");
        assert_eq!(messages[3]["content"], "Water is polar.");
    }

    #[tokio::test]
    async fn test_tool_failure_reported_to_model() {
        let backend = ScriptedBackend::new(vec![
            Ok(tool_call_response(
                "call_9",
                "extract_pdf_text",
                r#"{"file_path": "/missing/file.pdf"}"#,
            )),
            Ok(text_response("I could not read that file.")),
        ]);
        let result = agent(backend).run("Read /missing/file.pdf").await.unwrap();

        assert!(result.tool_calls[0].result.starts_with("Tool error:"));
        assert_eq!(result.output(), "I could not read that file.");
    }

    #[tokio::test]
    async fn test_missing_content_falls_back_to_raw() {
        let backend = ScriptedBackend::new(vec![Ok(empty_response())]);
        let result = agent(backend).run("Summarize").await.unwrap();

        assert!(result.is_degraded());
        assert_eq!(result.output(), result.raw_response);
        assert!(result.output().contains("CreateChatCompletionResponse"));
    }

    #[tokio::test]
    async fn test_remote_error_propagates() {
        let backend = ScriptedBackend::new(vec![Err(StudyNotesError::Remote(
            "connection reset".to_string(),
        ))]);
        let err = agent(backend).run("Summarize").await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let backend = ScriptedBackend::new(vec![
            Ok(tool_call_response("c1", "extract_pdf_text", r#"{"file_path": "a.pdf"}"#)),
            Ok(tool_call_response("c2", "extract_pdf_text", r#"{"file_path": "b.pdf"}"#)),
        ]);
        let err = agent(backend)
            .with_max_iterations(2)
            .run("Loop forever")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("maximum iterations (2)"));
    }
}
