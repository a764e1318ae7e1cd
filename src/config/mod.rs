//! Configuration system (layered: defaults < config file < env < command line).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::types::GenerationSettings;

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can read files.";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SIMPLE_AGENT_CONFIG";

const API_KEY_ENV: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Resolved runtime configuration.
#[derive(Clone)]
pub struct AgentConfig {
    api_key: Option<String>,
    pub model: String,
    /// Override for the Gemini API root, mostly useful for proxies and tests.
    pub base_url: Option<String>,
    pub system_prompt: String,
    pub settings: GenerationSettings,
    pub request_timeout: Duration,
    /// Attempts per model query, including the first. `1` disables retry.
    pub max_attempts: u32,
    pub parallel_tool_calls: bool,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("system_prompt", &self.system_prompt)
            .field("settings", &self.settings)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .field("parallel_tool_calls", &self.parallel_tool_calls)
            .finish()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            settings: GenerationSettings::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: 1,
            parallel_tool_calls: false,
        }
    }
}

/// Contents of the optional TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub parallel_tool_calls: Option<bool>,
}

impl ConfigFile {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AgentError::Configuration(format!("invalid config file: {e}")))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AgentError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }
}

/// Values supplied on the command line; they win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub parallel_tool_calls: bool,
}

impl AgentConfig {
    /// Load every layer below the command line.
    ///
    /// An explicit `path` (or `$SIMPLE_AGENT_CONFIG`) must exist; the default
    /// per-user file is used only when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // .env is optional
        let _ = dotenvy::dotenv();
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        let explicit = path.map(Path::to_path_buf).or_else(|| env(CONFIG_PATH_ENV).map(PathBuf::from));
        match explicit {
            Some(path) => config.apply_file(ConfigFile::read(&path)?),
            None => {
                if let Some(path) = default_config_path().filter(|p| p.is_file()) {
                    tracing::debug!(path = %path.display(), "loading config file");
                    config.apply_file(ConfigFile::read(&path)?);
                }
            }
        }
        config.apply_env(env)?;
        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(key) = file.api_key {
            self.api_key = Some(key);
        }
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(url) = file.base_url {
            self.base_url = Some(url);
        }
        if let Some(prompt) = file.system_prompt {
            self.system_prompt = prompt;
        }
        if let Some(t) = file.temperature {
            self.settings.temperature = t;
        }
        if let Some(max) = file.max_tokens {
            self.settings.max_tokens = Some(max);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = file.max_attempts {
            self.max_attempts = attempts;
        }
        if let Some(parallel) = file.parallel_tool_calls {
            self.parallel_tool_calls = parallel;
        }
    }

    /// Apply environment variables through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = API_KEY_ENV.iter().find_map(|name| lookup(name)) {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup("SIMPLE_AGENT_MODEL") {
            self.model = model;
        }
        if let Some(url) = lookup("SIMPLE_AGENT_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(raw) = lookup("SIMPLE_AGENT_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                AgentError::Configuration(format!("SIMPLE_AGENT_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            self.request_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(t) = overrides.temperature {
            self.settings.temperature = t;
        }
        if let Some(max) = overrides.max_tokens {
            self.settings.max_tokens = Some(max);
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = overrides.max_attempts {
            self.max_attempts = attempts;
        }
        if overrides.parallel_tool_calls {
            self.parallel_tool_calls = true;
        }
    }

    /// Reject configurations the assistant cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(AgentError::Configuration(
                "Missing GEMINI_API_KEY (or GOOGLE_API_KEY)".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(AgentError::Configuration("model id must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.settings.temperature) {
            return Err(AgentError::Configuration(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.settings.temperature
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(AgentError::Configuration("request timeout must be positive".into()));
        }
        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(AgentError::Configuration(format!(
                "request timeout must be at most {}s, got {}s",
                MAX_REQUEST_TIMEOUT.as_secs(),
                self.request_timeout.as_secs()
            )));
        }
        if self.max_attempts == 0 {
            return Err(AgentError::Configuration("max attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// Per-user config file location, e.g. `~/.config/simple-agent/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "simple-agent")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
