//! Provider capability layer — the single point of entry for all LLM calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to a provider API directly.
//! The orchestration core sees only `CompletionBackend`; which concrete
//! client sits behind each slot is decided once, at startup, from config —
//! never by runtime type inspection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::errors::ProviderFailure;

pub mod anthropic;
pub mod gemini;

/// Default sampling temperature for analysis calls.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default output token cap for analysis calls.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Which attempt produced a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProviderRole {
    Primary,
    Secondary,
}

/// One chat message in provider-neutral form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// A single completion request. Built fresh per call, never reused.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// The common case: one user prompt plus an optional system message.
    pub fn from_prompt(prompt: String, system: Option<String>) -> Self {
        CompletionRequest {
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            system,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Outcome of a successful `CompletionGateway::complete` call.
#[derive(Debug, Clone)]
pub struct CompletionResult {
    pub text: String,
    pub provider_used: ProviderRole,
    pub attempts: u32,
    pub latency: Duration,
}

/// A completion-capable LLM provider.
///
/// Implementations adapt the neutral `CompletionRequest` to their own wire
/// shape (chat-style ordered messages vs. a single flattened prompt) and
/// return plain output text. Stateless after construction, so one instance
/// is shared across concurrent tasks behind an `Arc`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short display name used in reports ("claude", "gemini").
    fn name(&self) -> &'static str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderFailure>;
}

/// Builds the two provider slots from configuration.
///
/// Slot A is the chat-style provider, slot B the single-prompt provider.
/// A slot whose credential is absent stays `None` and is treated as
/// pre-failed by the gateway — never attempted.
pub fn backends_from_config(
    config: &EngineConfig,
) -> (
    Option<Arc<dyn CompletionBackend>>,
    Option<Arc<dyn CompletionBackend>>,
) {
    let slot_a: Option<Arc<dyn CompletionBackend>> = match &config.anthropic_api_key {
        Some(key) => {
            info!("Chat-style provider configured (model: {})", anthropic::MODEL);
            Some(Arc::new(anthropic::AnthropicClient::new(key.clone())))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set — chat-style provider slot disabled");
            None
        }
    };

    let slot_b: Option<Arc<dyn CompletionBackend>> = match &config.gemini_api_key {
        Some(key) => {
            info!("Single-prompt provider configured (model: {})", gemini::MODEL);
            Some(Arc::new(gemini::GeminiClient::new(key.clone())))
        }
        None => {
            warn!("GEMINI_API_KEY not set — single-prompt provider slot disabled");
            None
        }
    };

    (slot_a, slot_b)
}
