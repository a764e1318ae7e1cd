//! Model provider trait and the Gemini implementation.

pub mod google;
pub mod http;

use async_trait::async_trait;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::tools::ToolDefinition;
use crate::types::{AssistantReply, FinishReason, GenerationSettings, Message, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Full outbound message list, system instruction first.
    pub messages: Vec<Message>,
    pub settings: GenerationSettings,
    pub tools: Vec<ToolDefinition>,
}

/// Response from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub reply: AssistantReply,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    /// The reply as a transcript message.
    pub fn into_message(self) -> Message {
        Message::Assistant { reply: self.reply }
    }
}

/// One synchronous request/response exchange with a hosted model.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g. "google").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Send the messages and declared tools, returning one assistant reply.
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, AgentError>;
}

/// Create the provider described by the configuration.
pub fn create_provider(config: &AgentConfig) -> Result<Box<dyn ModelProvider>, AgentError> {
    let api_key = config.api_key().ok_or_else(|| {
        AgentError::Configuration("Missing GEMINI_API_KEY (or GOOGLE_API_KEY)".into())
    })?;
    let client = http::build_client(config.request_timeout)?;
    Ok(Box::new(google::GoogleProvider::new(
        client,
        config.model.clone(),
        api_key.to_string(),
        config.base_url.clone(),
    )))
}
