//! Convenience re-exports for common use.

pub use crate::agent_loop::{AgentContext, ConversationLoop, LoopState};
pub use crate::config::AgentConfig;
pub use crate::console::{Console, TerminalConsole};
pub use crate::error::{AgentError, Result};
pub use crate::provider::{ModelProvider, ProviderRequest, ProviderResponse};
pub use crate::tools::{Tool, ToolArguments, ToolParameters, ToolRegistry};
pub use crate::types::{AssistantReply, GenerationSettings, Message, ToolCall, ToolResult, Transcript, Usage};
