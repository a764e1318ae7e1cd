//! Message types exchanged with the model.

use serde::{Deserialize, Serialize};

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Instruction text sent ahead of every query; never stored in a transcript.
    System { content: String },
    /// Free text typed by the operator.
    User { content: String },
    /// Model output.
    Assistant { reply: AssistantReply },
    /// The host's answer to one tool call.
    ToolResult(ToolResult),
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Create a text-only assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            reply: AssistantReply::Text(text.into()),
        }
    }

    /// Create an assistant message requesting tool calls.
    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            reply: AssistantReply::ToolCalls(calls),
        }
    }

    /// Create a tool result message.
    pub fn tool_result(result: ToolResult) -> Self {
        Self::ToolResult(result)
    }

    /// Tool calls carried by this message (empty unless it is an assistant tool request).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant {
                reply: AssistantReply::ToolCalls(calls),
            } => calls,
            _ => &[],
        }
    }

    /// Plain text of the message, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content } => Some(content),
            Self::Assistant {
                reply: AssistantReply::Text(text),
            } => Some(text),
            Self::ToolResult(result) => Some(&result.content),
            Self::Assistant { .. } => None,
        }
    }
}

/// An assistant reply either narrates or requests tools, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AssistantReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

impl AssistantReply {
    /// Build a reply from raw provider output.
    ///
    /// Tool calls take precedence; any accompanying text is dropped.
    pub fn from_parts(text: String, tool_calls: Vec<ToolCall>) -> Self {
        if tool_calls.is_empty() {
            Self::Text(text)
        } else {
            if !text.trim().is_empty() {
                tracing::debug!(dropped = %text, "discarding narration that accompanied tool calls");
            }
            Self::ToolCalls(tool_calls)
        }
    }

    pub fn requests_tools(&self) -> bool {
        matches!(self, Self::ToolCalls(calls) if !calls.is_empty())
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result of executing one tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    /// Name of the tool that produced this result.
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Error result; the content is prefixed with `Error: `.
    pub fn error(call: &ToolCall, message: impl std::fmt::Display) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: format!("Error: {message}"),
            is_error: true,
        }
    }
}
