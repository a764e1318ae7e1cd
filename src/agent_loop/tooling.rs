//! Executing the tool calls of one assistant reply.

use futures::future;

use crate::error::AgentError;
use crate::tools::ToolRegistry;
use crate::types::{ToolCall, ToolResult};

/// Run one call, turning every failure into an error result for that call id.
pub async fn execute_tool_call(registry: &ToolRegistry, call: &ToolCall) -> ToolResult {
    match registry.invoke(&call.name, &call.arguments).await {
        Ok(content) => ToolResult::success(call, content),
        Err(err) => {
            tracing::warn!(tool = %call.name, call_id = %call.id, error = %err, "tool call failed");
            ToolResult::error(call, tool_error_message(&err))
        }
    }
}

/// Run calls concurrently; results come back in call order.
pub async fn execute_parallel_tool_calls(
    registry: &ToolRegistry,
    calls: &[ToolCall],
) -> Vec<ToolResult> {
    future::join_all(calls.iter().map(|call| execute_tool_call(registry, call))).await
}

fn tool_error_message(err: &AgentError) -> String {
    match err {
        AgentError::ToolExecution { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
