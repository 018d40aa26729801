//! Construct-once agent factory.

use super::backend::{ChatBackend, OpenAIBackend};
use super::runner::Agent;
use super::tools::{ExtractPdfText, ToolRegistry};
use crate::config::{Prompts, Settings};
use crate::error::{Result, StudyNotesError};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Resolved, validated agent configuration.
#[derive(Clone)]
pub struct AgentConfig {
    pub name: String,
    pub model: String,
    pub base_url: String,
    pub instructions: String,
    pub timeout: Duration,
    pub max_iterations: usize,
    api_key: String,
}

impl AgentConfig {
    /// Resolve the configuration, reading the credential through `lookup`.
    pub fn resolve<F>(settings: &Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model = &settings.model;
        let api_key = validate_api_key(&model.api_key_env, lookup(&model.api_key_env))?;
        let base_url = validate_base_url(&model.base_url)?;

        if model.model.trim().is_empty() {
            return Err(StudyNotesError::Config("model identifier is empty".to_string()));
        }
        if model.max_iterations == 0 {
            return Err(StudyNotesError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self {
            name: model.agent_name.clone(),
            model: model.model.clone(),
            base_url,
            instructions: Prompts::render(&prompts.instructions, &prompts.variables),
            timeout: Duration::from_secs(model.timeout_secs),
            max_iterations: model.max_iterations,
            api_key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_iterations", &self.max_iterations)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Check the credential is present and non-blank.
pub fn validate_api_key(env_var: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        Some(_) => Err(StudyNotesError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            env_var, env_var
        ))),
        None => Err(StudyNotesError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            env_var, env_var
        ))),
    }
}

/// Check the endpoint is an absolute http(s) URL.
pub fn validate_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| StudyNotesError::Config(format!("Invalid base URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(StudyNotesError::Config(format!(
            "Invalid base URL '{}': unsupported scheme '{}'",
            raw, other
        ))),
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;
type BackendBuilder = Box<dyn Fn(&AgentConfig) -> Result<Arc<dyn ChatBackend>> + Send + Sync>;

/// Builds the agent on first use and hands out the same instance afterwards.
///
/// A failed construction is not cached; the next call tries again.
pub struct AgentFactory {
    settings: Settings,
    env: EnvLookup,
    backend: BackendBuilder,
    agent: OnceCell<Arc<Agent>>,
    constructions: AtomicUsize,
}

impl AgentFactory {
    /// Factory reading the credential from the process environment.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            env: Box::new(|name| std::env::var(name).ok()),
            backend: Box::new(|config| {
                let backend: Arc<dyn ChatBackend> = Arc::new(OpenAIBackend::new(config)?);
                Ok(backend)
            }),
            agent: OnceCell::new(),
            constructions: AtomicUsize::new(0),
        }
    }

    /// Read the credential through `lookup` instead of the environment.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Use `build` to create the chat backend.
    pub fn with_backend<F>(mut self, build: F) -> Self
    where
        F: Fn(&AgentConfig) -> Result<Arc<dyn ChatBackend>> + Send + Sync + 'static,
    {
        self.backend = Box::new(build);
        self
    }

    /// The shared agent, constructing it on the first call.
    pub fn get(&self) -> Result<Arc<Agent>> {
        self.agent.get_or_try_init(|| self.construct()).cloned()
    }

    /// How many times client setup has run.
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    fn construct(&self) -> Result<Arc<Agent>> {
        let config = AgentConfig::resolve(&self.settings, |name| (self.env)(name))?;
        let backend = (self.backend)(&config)?;
        self.constructions.fetch_add(1, Ordering::SeqCst);

        let tools = ToolRegistry::new().register(Arc::new(ExtractPdfText));
        info!(
            "Agent '{}' ready (model {}, endpoint {}, tools {:?})",
            config.name,
            config.model,
            config.base_url,
            tools.names()
        );

        Ok(Arc::new(
            Agent::new(backend, &config.model)
                .with_name(&config.name)
                .with_instructions(&config.instructions)
                .with_tools(tools)
                .with_max_iterations(config.max_iterations),
        ))
    }
}

static SHARED: OnceCell<AgentFactory> = OnceCell::new();

/// The process-wide agent.
///
/// The first call fixes the settings used for the rest of the process.
pub fn shared_agent(settings: &Settings) -> Result<Arc<Agent>> {
    SHARED
        .get_or_init(|| AgentFactory::new(settings.clone()))
        .get()
}
