//! Simple Agent: a terminal assistant that can read files.
//!
//! The conversation is a three-state loop: wait for the operator, query the
//! model, run any tools the model asked for, and go back to the model with the
//! results. Gemini is the model provider and `file_read` the only tool.
//!
//! ```no_run
//! use simple_agent::prelude::*;
//! use simple_agent::provider::create_provider;
//! use simple_agent::tools::default_tools;
//!
//! # async fn example() -> simple_agent::error::Result<()> {
//! let config = AgentConfig::load(None)?;
//! config.validate()?;
//! let ctx = AgentContext::from_config(
//!     &config,
//!     create_provider(&config)?,
//!     Box::new(TerminalConsole::new()),
//!     ToolRegistry::new(default_tools())?,
//!     std::env::current_dir()?,
//! );
//! ConversationLoop::new(ctx).run().await
//! # }
//! ```

pub mod agent_loop;
pub mod config;
pub mod console;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
