//! Chat-style provider client — Anthropic Messages API.
//!
//! Exactly one attempt per call: retry and fail-over policy live in
//! `CompletionGateway`, not here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ProviderFailure;
use crate::providers::{CompletionBackend, CompletionRequest};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all chat-style analysis calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";

/// Transport-level ceiling. The effective per-attempt limit is the gateway's
/// sub-deadline, which is always tighter than this.
const HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionBackend for AnthropicClient {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderFailure> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            // Prefer the structured API error message when the body parses
            let message = serde_json::from_str::<ApiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(ProviderFailure::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response.json().await?;

        debug!(
            "Chat-style call succeeded: input_tokens={}, output_tokens={}",
            parsed.usage.input_tokens, parsed.usage.output_tokens
        );

        let text = parsed
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderFailure::EmptyContent);
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Message;

    #[test]
    fn test_request_serializes_with_system() {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: 1024,
            temperature: 0.7,
            system: Some("be terse"),
            messages: vec![WireMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "be terse");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 1024);
    }

    #[test]
    fn test_request_omits_absent_system() {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: 1024,
            temperature: 0.7,
            system: None,
            messages: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_response_text_extraction_skips_non_text_blocks() {
        let raw = r#"{
            "content": [
                {"type": "thinking", "text": null},
                {"type": "text", "text": "the answer"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref());
        assert_eq!(text, Some("the answer"));
    }

    #[test]
    fn test_wire_messages_preserve_order() {
        let request = CompletionRequest {
            messages: vec![
                Message {
                    role: "user".to_string(),
                    content: "first".to_string(),
                },
                Message {
                    role: "assistant".to_string(),
                    content: "second".to_string(),
                },
            ],
            system: None,
            temperature: 0.7,
            max_tokens: 256,
        };
        let wire: Vec<WireMessage> = request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: &m.role,
                content: &m.content,
            })
            .collect();
        assert_eq!(wire[0].content, "first");
        assert_eq!(wire[1].role, "assistant");
    }
}
