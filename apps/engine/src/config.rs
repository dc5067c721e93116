use std::time::Duration;

use anyhow::{Context, Result};

/// Overall wall-clock budget for one `analyze()` call. Simple sites finish
/// well under 30s; complex ones are cut off near this limit.
pub const DEFAULT_ANALYSIS_DEADLINE_SECS: u64 = 45;

/// Sub-deadline for a single provider attempt. Kept strictly below the
/// overall deadline so a failed primary still leaves room for the backup
/// attempt and, if needed, offline synthesis.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 20;

/// Engine configuration loaded from environment variables.
///
/// Provider credentials are optional on purpose: a missing key disables that
/// provider's slot (it is never attempted) and the engine degrades to the
/// remaining provider or to offline synthesis.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub overall_deadline: Duration,
    pub attempt_timeout: Duration,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(EngineConfig {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            overall_deadline: duration_env(
                "ANALYSIS_DEADLINE_SECS",
                DEFAULT_ANALYSIS_DEADLINE_SECS,
            )?,
            attempt_timeout: duration_env(
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?,
        })
    }
}

/// Reads an optional variable, treating blank values the same as absent ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn duration_env(key: &str, default_secs: u64) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .with_context(|| format!("'{key}' must be a whole number of seconds")),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}
