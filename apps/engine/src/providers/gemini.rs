//! Single-prompt provider client — Gemini generateContent API.
//!
//! This backend does not take ordered chat messages: the neutral request is
//! flattened into one prompt ("Role: content" lines), with the system
//! message carried separately as the API's system instruction.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ProviderFailure;
use crate::providers::{CompletionBackend, CompletionRequest};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all single-prompt analysis calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.0-flash";

const HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent<'a>>,
    contents: Vec<WireContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
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
impl CompletionBackend for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderFailure> {
        let prompt = flatten_request(request);

        let body = GenerateRequest {
            system_instruction: request.system.as_deref().map(|s| WireContent {
                parts: vec![WirePart { text: s }],
            }),
            contents: vec![WireContent {
                parts: vec![WirePart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let url = format!("{API_BASE}/{MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(ProviderFailure::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderFailure::EmptyContent);
        }

        debug!("Single-prompt call succeeded: {} output chars", text.len());

        Ok(text)
    }
}

/// Flattens ordered chat messages into one prompt for the single-prompt API:
/// one "Role: content" line per message, blank-line separated. The system
/// message is NOT included here — it travels as the system instruction.
fn flatten_request(request: &CompletionRequest) -> String {
    request
        .messages
        .iter()
        .map(|m| format!("{}: {}", display_role(&m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn display_role(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Message;

    fn chat_request(messages: Vec<(&str, &str)>) -> CompletionRequest {
        CompletionRequest {
            messages: messages
                .into_iter()
                .map(|(role, content)| Message {
                    role: role.to_string(),
                    content: content.to_string(),
                })
                .collect(),
            system: None,
            temperature: 0.7,
            max_tokens: 256,
        }
    }

    #[test]
    fn test_flatten_single_user_message() {
        let request = chat_request(vec![("user", "analyze the website")]);
        assert_eq!(flatten_request(&request), "User: analyze the website");
    }

    #[test]
    fn test_flatten_preserves_message_order() {
        let request = chat_request(vec![
            ("user", "first question"),
            ("assistant", "an answer"),
            ("user", "follow-up"),
        ]);
        assert_eq!(
            flatten_request(&request),
            "User: first question\n\nAssistant: an answer\n\nUser: follow-up"
        );
    }

    #[test]
    fn test_system_goes_to_system_instruction_not_prompt() {
        let mut request = chat_request(vec![("user", "hello")]);
        request.system = Some("you are a marketing analyst".to_string());

        let prompt = flatten_request(&request);
        assert!(!prompt.contains("marketing analyst"));

        let body = GenerateRequest {
            system_instruction: request.system.as_deref().map(|s| WireContent {
                parts: vec![WirePart { text: s }],
            }),
            contents: vec![WireContent {
                parts: vec![WirePart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 256,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "you are a marketing analyst"
        );
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\""}, {"text": ": 1}"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        assert_eq!(text, r#"{"a": 1}"#);
    }

    #[test]
    fn test_empty_candidates_deserialize() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
