//! Google Gemini API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::AgentError;
use crate::types::{AssistantReply, FinishReason, Message, ToolCall, Usage};

use super::http::{google_headers, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// Prefix for call ids minted locally when Gemini omits one; never sent back.
const LOCAL_CALL_ID_PREFIX: &str = "local-";

/// The call id to echo on the wire, if Gemini assigned it.
fn wire_call_id(id: &str) -> Option<&str> {
    (!id.is_empty() && !id.starts_with(LOCAL_CALL_ID_PREFIX)).then_some(id)
}

pub struct GoogleProvider {
    client: reqwest::Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(
        client: reqwest::Client,
        model: String,
        api_key: String,
        base_url: Option<String>,
    ) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client,
            model,
            api_key,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Translate a provider request into a `generateContent` body.
pub fn build_request_body(request: &ProviderRequest) -> Value {
    let mut system_parts = Vec::new();
    let mut contents: Vec<Value> = Vec::new();
    let mut pending_responses: Vec<Value> = Vec::new();

    for msg in &request.messages {
        if !matches!(msg, Message::ToolResult(_)) && !pending_responses.is_empty() {
            contents.push(json!({ "role": "user", "parts": std::mem::take(&mut pending_responses) }));
        }
        match msg {
            Message::System { content } => system_parts.push(json!({ "text": content })),
            Message::User { content } => {
                contents.push(json!({ "role": "user", "parts": [{ "text": content }] }));
            }
            Message::Assistant {
                reply: AssistantReply::Text(text),
            } => {
                // Gemini rejects empty text parts.
                if !text.is_empty() {
                    contents.push(json!({ "role": "model", "parts": [{ "text": text }] }));
                }
            }
            Message::Assistant {
                reply: AssistantReply::ToolCalls(calls),
            } => {
                let parts: Vec<Value> = calls
                    .iter()
                    .map(|call| {
                        let mut function_call = json!({ "name": call.name, "args": call.arguments });
                        if let Some(id) = wire_call_id(&call.id) {
                            function_call["id"] = json!(id);
                        }
                        json!({ "functionCall": function_call })
                    })
                    .collect();
                if !parts.is_empty() {
                    contents.push(json!({ "role": "model", "parts": parts }));
                }
            }
            Message::ToolResult(result) => {
                let response = if result.is_error {
                    json!({ "error": result.content })
                } else {
                    json!({ "content": result.content })
                };
                let mut function_response = json!({ "name": result.name, "response": response });
                if let Some(id) = wire_call_id(&result.call_id) {
                    function_response["id"] = json!(id);
                }
                pending_responses.push(json!({ "functionResponse": function_response }));
            }
        }
    }
    if !pending_responses.is_empty() {
        contents.push(json!({ "role": "user", "parts": pending_responses }));
    }

    let mut body = json!({ "contents": contents });
    if let Some(obj) = body.as_object_mut() {
        if !system_parts.is_empty() {
            obj.insert("systemInstruction".into(), json!({ "parts": system_parts }));
        }

        let settings = &request.settings;
        let mut gen_config = serde_json::Map::new();
        gen_config.insert("temperature".into(), settings.temperature.into());
        if let Some(max) = settings.max_tokens {
            gen_config.insert("maxOutputTokens".into(), max.into());
        }
        if let Some(top_p) = settings.top_p {
            gen_config.insert("topP".into(), top_p.into());
        }
        obj.insert("generationConfig".into(), Value::Object(gen_config));

        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            obj.insert("tools".into(), json!([{ "functionDeclarations": declarations }]));
        }
    }

    body
}

/// Turn a decoded `generateContent` response into a provider response.
fn parse_response(data: GeminiResponse) -> Result<ProviderResponse, AgentError> {
    let candidate = match data.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = data
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(AgentError::Provider {
                provider: "google".into(),
                message: reason,
            });
        }
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(fc) = part.function_call {
            tool_calls.push(ToolCall {
                id: fc
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("{LOCAL_CALL_ID_PREFIX}{}", uuid::Uuid::new_v4())),
                name: fc.name,
                arguments: fc.args.unwrap_or_else(|| json!({})),
            });
        }
    }

    if text.is_empty() && tool_calls.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unspecified");
        return Err(AgentError::Provider {
            provider: "google".into(),
            message: format!("empty reply (finish reason: {reason})"),
        });
    }

    let finish_reason = match candidate.finish_reason.as_deref() {
        _ if !tool_calls.is_empty() => Some(FinishReason::ToolCalls),
        Some("STOP") => Some(FinishReason::Stop),
        Some("MAX_TOKENS") => Some(FinishReason::Length),
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            Some(FinishReason::ContentFilter)
        }
        Some(_) => Some(FinishReason::Other),
        None => None,
    };

    let usage = data
        .usage_metadata
        .map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    Ok(ProviderResponse {
        reply: AssistantReply::from_parts(text, tool_calls),
        usage,
        finish_reason,
    })
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, AgentError> {
        let body = build_request_body(request);

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Google generateContent"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .headers(google_headers(&self.api_key)?)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let raw = resp.text().await?;
        let data: GeminiResponse = serde_json::from_str(&raw)?;
        parse_response(data)
    }
}

// Wire types for the generateContent response.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    id: Option<String>,
    name: String,
    args: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
