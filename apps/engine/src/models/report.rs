use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two analysis tasks the orchestrator runs per website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Business,
    Storytelling,
}

/// Result of one analysis task.
///
/// `structured_result` always contains every required key of its task,
/// whether it came from a real provider or from offline synthesis — only
/// `degraded` reveals which.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub kind: TaskKind,
    pub structured_result: Map<String, Value>,
    /// Backend name ("claude", "gemini") or "offline" for synthesized results.
    pub provider_used: String,
    pub used_backup: bool,
    pub degraded: bool,
}

/// The full report returned by `DualAnalysisOrchestrator::analyze`.
/// The HTTP layer serializes this verbatim into the public API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteAnalysisReport {
    pub url: String,
    pub business: AnalysisOutcome,
    pub storytelling: AnalysisOutcome,
    /// Always true: each provider backs up the other's primary task.
    pub cross_backup_system: bool,
    /// Human-readable provider name, or "fallback" for a degraded outcome.
    pub business_ai: String,
    pub storytelling_ai: String,
    pub analysis_type: String,
    /// True iff the overall deadline fired before both tasks finished.
    pub timeout_handled: bool,
    pub generated_at: DateTime<Utc>,
}
