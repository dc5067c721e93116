use thiserror::Error;

/// A single provider attempt failed.
///
/// Absorbed inside `CompletionGateway` — callers only ever see it wrapped in
/// `ProviderExhausted` once both the primary and the backup attempt failed.
#[derive(Debug, Error)]
pub enum ProviderFailure {
    #[error("provider disabled: no credential configured")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("attempt exceeded the {}s sub-deadline", .limit.as_secs())]
    Timeout { limit: std::time::Duration },

    #[error("provider returned empty content")]
    EmptyContent,
}

/// Both providers failed for one completion request. Carries both causes so
/// the log line shows why each side fell over.
#[derive(Debug, Error)]
#[error("both providers failed — primary: {primary}; backup: {backup}")]
pub struct ProviderExhausted {
    pub primary: ProviderFailure,
    pub backup: ProviderFailure,
}

/// A provider returned text, but the text is not a usable structured result.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing or null required keys: {}", .keys.join(", "))]
    MissingKeys { keys: Vec<String> },
}
