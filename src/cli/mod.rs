//! Command-line arguments for the `simple-agent` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigOverrides;

/// Chat with Gemini from the terminal; the model may read files you mention.
#[derive(Parser, Debug)]
#[command(name = "simple-agent", version, about)]
pub struct Cli {
    /// Gemini model id (overrides SIMPLE_AGENT_MODEL and the config file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max output tokens per reply
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Seconds to wait for each model reply
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Attempts per model query, including the first
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Run the tool calls of one reply concurrently
    #[arg(long)]
    pub parallel_tools: bool,

    /// Path to a TOML config file
    #[arg(short, long, env = "SIMPLE_AGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level when RUST_LOG is unset
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line values as the top configuration layer.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout_secs: self.timeout_secs,
            max_attempts: self.max_attempts,
            parallel_tool_calls: self.parallel_tools,
        }
    }
}
