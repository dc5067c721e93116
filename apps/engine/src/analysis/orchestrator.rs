//! Dual analysis orchestration — turns scraped website content into a full
//! marketing analysis report, whatever the providers do.
//!
//! Flow per task: build prompt → gateway (primary → backup) → validate →
//! (on any failure) offline synthesis. The two tasks run concurrently under
//! one shared wall-clock deadline; expiry cancels in-flight provider calls,
//! synthesizes unfinished tasks and keeps finished ones. `analyze` never
//! fails — the caller always gets a complete report.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::analysis::fallback;
use crate::analysis::tasks::{AnalysisTask, ProviderSlot, TASKS};
use crate::analysis::validator;
use crate::config::{
    EngineConfig, DEFAULT_ANALYSIS_DEADLINE_SECS, DEFAULT_PROVIDER_TIMEOUT_SECS,
};
use crate::errors::ProviderExhausted;
use crate::gateway::CompletionGateway;
use crate::models::content::ContentData;
use crate::models::report::{AnalysisOutcome, WebsiteAnalysisReport};
use crate::providers::{
    self, CompletionBackend, CompletionRequest, CompletionResult, ProviderRole,
};

/// Tag stamped on every report so API consumers can route on report shape.
pub const ANALYSIS_TYPE: &str = "dual_ai_analysis";

/// `provider_used` marker for synthesized outcomes.
const OFFLINE_PROVIDER: &str = "offline";
/// `business_ai` / `storytelling_ai` label for degraded outcomes.
const FALLBACK_LABEL: &str = "fallback";

/// Timing knobs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Wall-clock budget for one `analyze()` call.
    pub overall_deadline: Duration,
    /// Sub-deadline per provider attempt, strictly shorter than the overall
    /// budget so backup and synthesis still fit after a timed-out primary.
    pub attempt_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            overall_deadline: Duration::from_secs(DEFAULT_ANALYSIS_DEADLINE_SECS),
            attempt_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }
}

/// Runs the two analysis tasks with cross-assigned provider roles.
///
/// Slot A (chat-style) is primary for BUSINESS and backup for STORYTELLING;
/// slot B (single-prompt) the reverse. Cheap to clone — both slots are
/// shared behind `Arc`s.
#[derive(Clone)]
pub struct DualAnalysisOrchestrator {
    slot_a: Option<Arc<dyn CompletionBackend>>,
    slot_b: Option<Arc<dyn CompletionBackend>>,
    gateway: CompletionGateway,
    settings: OrchestratorSettings,
}

impl DualAnalysisOrchestrator {
    pub fn new(
        slot_a: Option<Arc<dyn CompletionBackend>>,
        slot_b: Option<Arc<dyn CompletionBackend>>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            slot_a,
            slot_b,
            gateway: CompletionGateway::new(settings.attempt_timeout),
            settings,
        }
    }

    /// Builds the orchestrator with the production provider clients, each
    /// slot disabled when its credential is absent.
    pub fn from_config(config: &EngineConfig) -> Self {
        let (slot_a, slot_b) = providers::backends_from_config(config);
        Self::new(
            slot_a,
            slot_b,
            OrchestratorSettings {
                overall_deadline: config.overall_deadline,
                attempt_timeout: config.attempt_timeout,
            },
        )
    }

    /// Analyzes one website. Always returns a complete report: provider
    /// outages, invalid responses and deadline expiry all degrade to
    /// synthesized outcomes instead of errors.
    pub async fn analyze(&self, content: &ContentData, url: &str) -> WebsiteAnalysisReport {
        let deadline = Instant::now() + self.settings.overall_deadline;
        info!("Starting dual analysis for {url}");

        let business_handle = self.spawn_task(&TASKS[0], content, url);
        let storytelling_handle = self.spawn_task(&TASKS[1], content, url);

        let (business, business_timed_out) =
            Self::collect_outcome(deadline, business_handle, &TASKS[0], content, url).await;
        let (storytelling, storytelling_timed_out) =
            Self::collect_outcome(deadline, storytelling_handle, &TASKS[1], content, url).await;

        let timeout_handled = business_timed_out || storytelling_timed_out;
        if timeout_handled {
            warn!(
                "Analysis deadline ({}s) fired for {url} — unfinished tasks synthesized",
                self.settings.overall_deadline.as_secs()
            );
        }

        info!(
            "Dual analysis finished for {url}: business={}, storytelling={}",
            outcome_label(&business),
            outcome_label(&storytelling)
        );

        let business_ai = provider_label(&business);
        let storytelling_ai = provider_label(&storytelling);

        WebsiteAnalysisReport {
            url: url.to_string(),
            business,
            storytelling,
            cross_backup_system: true,
            business_ai,
            storytelling_ai,
            analysis_type: ANALYSIS_TYPE.to_string(),
            timeout_handled,
            generated_at: Utc::now(),
        }
    }

    /// Single-shot text generation with the same automatic fallback, for
    /// backend features outside the dual analysis (slot A primary, slot B
    /// backup).
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, ProviderExhausted> {
        self.gateway
            .complete(request, self.slot_a.as_deref(), self.slot_b.as_deref())
            .await
    }

    fn spawn_task(
        &self,
        task: &'static AnalysisTask,
        content: &ContentData,
        url: &str,
    ) -> JoinHandle<AnalysisOutcome> {
        let this = self.clone();
        let content = content.clone();
        let url = url.to_string();
        tokio::spawn(async move { this.run_task(task, &content, &url).await })
    }

    /// Awaits one task under the shared deadline. Expiry aborts the task
    /// (cancelling its in-flight provider call) and synthesizes; a finished
    /// task is returned as-is even when the other one timed out.
    async fn collect_outcome(
        deadline: Instant,
        mut handle: JoinHandle<AnalysisOutcome>,
        task: &AnalysisTask,
        content: &ContentData,
        url: &str,
    ) -> (AnalysisOutcome, bool) {
        match timeout_at(deadline, &mut handle).await {
            Ok(Ok(outcome)) => (outcome, false),
            Ok(Err(join_err)) => {
                warn!("{:?} task aborted unexpectedly: {join_err}", task.kind);
                (synthesized_outcome(task, content, url), false)
            }
            Err(_) => {
                handle.abort();
                (synthesized_outcome(task, content, url), true)
            }
        }
    }

    /// One task, start to finish. Infallible: every failure path ends in the
    /// synthesizer.
    async fn run_task(
        &self,
        task: &AnalysisTask,
        content: &ContentData,
        url: &str,
    ) -> AnalysisOutcome {
        let request = CompletionRequest::from_prompt(
            task.build_prompt(content, url),
            Some(task.system().to_string()),
        );
        let (primary, backup) = self.slots_for(task);

        let completion = match self
            .gateway
            .complete(&request, primary.as_deref(), backup.as_deref())
            .await
        {
            Ok(completion) => completion,
            Err(exhausted) => {
                warn!("{:?} task exhausted both providers: {exhausted}", task.kind);
                return synthesized_outcome(task, content, url);
            }
        };

        match validator::validate(&completion.text, task.required_keys) {
            Ok(structured_result) => {
                let used_backup = completion.provider_used == ProviderRole::Secondary;
                let backend = if used_backup { backup } else { primary };
                // a successful role always has a backend behind it
                let provider_used = backend
                    .map(|b| b.name().to_string())
                    .unwrap_or_else(|| OFFLINE_PROVIDER.to_string());

                info!(
                    "{:?} task answered by {provider_used} in {}ms ({} attempt(s))",
                    task.kind,
                    completion.latency.as_millis(),
                    completion.attempts
                );

                AnalysisOutcome {
                    kind: task.kind,
                    structured_result,
                    provider_used,
                    used_backup,
                    degraded: false,
                }
            }
            Err(validation_err) => {
                warn!(
                    "{:?} response failed validation: {validation_err}",
                    task.kind
                );
                synthesized_outcome(task, content, url)
            }
        }
    }

    fn slots_for(
        &self,
        task: &AnalysisTask,
    ) -> (
        Option<Arc<dyn CompletionBackend>>,
        Option<Arc<dyn CompletionBackend>>,
    ) {
        match task.primary {
            ProviderSlot::A => (self.slot_a.clone(), self.slot_b.clone()),
            ProviderSlot::B => (self.slot_b.clone(), self.slot_a.clone()),
        }
    }
}

fn synthesized_outcome(task: &AnalysisTask, content: &ContentData, url: &str) -> AnalysisOutcome {
    AnalysisOutcome {
        kind: task.kind,
        structured_result: fallback::synthesize(content, url, task.kind),
        provider_used: OFFLINE_PROVIDER.to_string(),
        used_backup: false,
        degraded: true,
    }
}

fn provider_label(outcome: &AnalysisOutcome) -> String {
    if outcome.degraded {
        FALLBACK_LABEL.to_string()
    } else {
        outcome.provider_used.clone()
    }
}

fn outcome_label(outcome: &AnalysisOutcome) -> &str {
    if outcome.degraded {
        "degraded"
    } else {
        &outcome.provider_used
    }
}
