//! Shared test helpers: a scripted provider and a scripted console.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use simple_agent::agent_loop::AgentContext;
use simple_agent::console::Console;
use simple_agent::error::{AgentError, Result};
use simple_agent::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use simple_agent::tools::{default_tools, ToolRegistry};
use simple_agent::types::*;

/// A provider that replays queued replies and records every request.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<Result<ProviderResponse>>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_text(&self, text: &str) -> &Self {
        self.queue(Ok(ProviderResponse {
            reply: AssistantReply::Text(text.to_string()),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some(FinishReason::Stop),
        }))
    }

    pub fn queue_tool_calls(&self, calls: Vec<ToolCall>) -> &Self {
        self.queue(Ok(ProviderResponse {
            reply: AssistantReply::ToolCalls(calls),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: Some(FinishReason::ToolCalls),
        }))
    }

    pub fn queue_error(&self, error: AgentError) -> &Self {
        self.queue(Err(error))
    }

    fn queue(&self, reply: Result<ProviderResponse>) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::api(500, "no scripted reply left")))
    }
}

/// Everything the loop showed the operator, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Banner(String),
    User(String),
    Assistant(String),
    ToolCalls(Vec<ToolCall>),
    ToolResult(ToolResult),
    Error(String),
}

/// A console fed from a list of lines; `None` once the list runs out.
#[derive(Clone, Default)]
pub struct ScriptedConsole {
    input: Arc<Mutex<VecDeque<String>>>,
    shown: Arc<Mutex<Vec<Shown>>>,
}

impl ScriptedConsole {
    pub fn with_lines(lines: &[&str]) -> Self {
        let console = Self::default();
        console
            .input
            .lock()
            .unwrap()
            .extend(lines.iter().map(|l| l.to_string()));
        console
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    fn record(&self, item: Shown) -> Result<()> {
        self.shown.lock().unwrap().push(item);
        Ok(())
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.input.lock().unwrap().pop_front())
    }

    fn show_banner(&mut self, model_id: &str) -> Result<()> {
        self.record(Shown::Banner(model_id.to_string()))
    }

    fn show_user(&mut self, text: &str) -> Result<()> {
        self.record(Shown::User(text.to_string()))
    }

    fn show_assistant(&mut self, text: &str) -> Result<()> {
        self.record(Shown::Assistant(text.to_string()))
    }

    fn show_tool_calls(&mut self, calls: &[ToolCall]) -> Result<()> {
        self.record(Shown::ToolCalls(calls.to_vec()))
    }

    fn show_tool_result(&mut self, result: &ToolResult) -> Result<()> {
        self.record(Shown::ToolResult(result.clone()))
    }

    fn show_error(&mut self, error: &AgentError) -> Result<()> {
        self.record(Shown::Error(error.to_string()))
    }
}

/// Context with the default tools, a fixed working directory and no greeting.
pub fn context(provider: &ScriptedProvider, console: &ScriptedConsole) -> AgentContext {
    AgentContext::builder()
        .provider(Box::new(provider.clone()))
        .console(Box::new(console.clone()))
        .registry(ToolRegistry::new(default_tools()).expect("default tools register"))
        .working_dir("/work")
        .build()
}

/// Text-free view of a message for order assertions.
pub fn kind(message: &Message) -> &'static str {
    match message {
        Message::System { .. } => "system",
        Message::User { .. } => "user",
        Message::Assistant {
            reply: AssistantReply::Text(_),
        } => "assistant_text",
        Message::Assistant {
            reply: AssistantReply::ToolCalls(_),
        } => "assistant_tools",
        Message::ToolResult(_) => "tool_result",
    }
}
