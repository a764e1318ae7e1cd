//! Process-wide collaborators handed to the conversation loop.

use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

use crate::config::{AgentConfig, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SYSTEM_PROMPT};
use crate::console::Console;
use crate::provider::ModelProvider;
use crate::tools::ToolRegistry;
use crate::types::GenerationSettings;
use crate::util::retry::RetryPolicy;

/// Opening line seeded into a fresh transcript.
pub const DEFAULT_GREETING: &str = "Hello! How can I assist you today?";

/// Everything the loop needs, constructed once at startup.
#[derive(Builder)]
pub struct AgentContext {
    pub provider: Box<dyn ModelProvider>,
    pub console: Box<dyn Console>,
    #[builder(default)]
    pub registry: ToolRegistry,
    #[builder(default)]
    pub settings: GenerationSettings,
    #[builder(default = DEFAULT_SYSTEM_PROMPT.to_string(), into)]
    pub system_prompt: String,
    #[builder(default = std::env::current_dir().unwrap_or_default(), into)]
    pub working_dir: PathBuf,
    /// Assistant line the transcript starts with, if any.
    #[builder(into)]
    pub greeting: Option<String>,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    #[builder(default)]
    pub retry: RetryPolicy,
    #[builder(default)]
    pub parallel_tool_calls: bool,
}

impl AgentContext {
    /// Assemble a context from resolved configuration.
    pub fn from_config(
        config: &AgentConfig,
        provider: Box<dyn ModelProvider>,
        console: Box<dyn Console>,
        registry: ToolRegistry,
        working_dir: PathBuf,
    ) -> Self {
        Self::builder()
            .provider(provider)
            .console(console)
            .registry(registry)
            .settings(config.settings.clone())
            .system_prompt(config.system_prompt.clone())
            .working_dir(working_dir)
            .greeting(DEFAULT_GREETING)
            .request_timeout(config.request_timeout)
            .retry(RetryPolicy::with_attempts(config.max_attempts))
            .parallel_tool_calls(config.parallel_tool_calls)
            .build()
    }

    /// The informational message telling the model where relative paths resolve.
    pub fn working_directory_notice(&self) -> String {
        format!("Working directory: {}", self.working_dir.display())
    }
}
