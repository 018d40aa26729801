//! Prompt templates for studynotes.
//!
//! Templates can be customized by placing a `prompts.toml` file in the
//! custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// System instructions given to the agent.
    pub instructions: String,
    /// Task template for the bullet-point summary. `{{text}}` is the extracted text.
    pub summary: String,
    /// Task template for the multiple-choice quiz. `{{text}}` is the extracted text.
    pub quiz: String,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            instructions: "You are a Study Notes Assistant. First produce a concise summary in \
                bullets, then generate a multiple-choice quiz from the text."
                .to_string(),
            summary: "Summarize this text into concise bullet points:\n\n{{text}}".to_string(),
            quiz: "Create a 5-question multiple-choice quiz (with 4 options each, mark the \
                correct answer) from the following text:\n\n{{text}}"
                .to_string(),
            variables: HashMap::new(),
        }
    }
}

impl Prompts {
    /// Load prompts, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let path = PathBuf::from(shellexpand::tilde(dir).to_string()).join("prompts.toml");
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                prompts = toml::from_str(&content)?;
            }
        }

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    ///
    /// `text` is substituted last so that extracted document text containing
    /// `{{...}}` sequences is inserted verbatim.
    pub fn render_with_text(&self, template: &str, text: &str) -> String {
        let rendered = Self::render(template, &self.variables);
        rendered.replace("{{text}}", text)
    }
}
