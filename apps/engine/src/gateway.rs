//! Completion Gateway — one request, two providers, at most one attempt each.
//!
//! Flow: primary attempt → on any failure (timeout, auth, rate limit, empty
//! response, disabled slot), log the cause and fall through to the backup →
//! `ProviderExhausted` only if both attempts fail. Retry policy beyond one
//! attempt per provider is the caller's responsibility.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::errors::{ProviderExhausted, ProviderFailure};
use crate::providers::{CompletionBackend, CompletionRequest, CompletionResult, ProviderRole};

#[derive(Debug, Clone)]
pub struct CompletionGateway {
    /// Sub-deadline for a single provider attempt. Strictly shorter than the
    /// orchestrator's overall deadline so a timed-out primary still leaves
    /// room for the backup attempt.
    attempt_timeout: Duration,
}

impl CompletionGateway {
    pub fn new(attempt_timeout: Duration) -> Self {
        Self { attempt_timeout }
    }

    /// Executes the request against `primary`, falling back to `backup` on
    /// failure. A `None` slot (no credential configured) counts as a failed
    /// attempt without ever being called.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        primary: Option<&dyn CompletionBackend>,
        backup: Option<&dyn CompletionBackend>,
    ) -> Result<CompletionResult, ProviderExhausted> {
        let started = Instant::now();

        let primary_err = match self.attempt(request, primary).await {
            Ok(text) => {
                return Ok(CompletionResult {
                    text,
                    provider_used: ProviderRole::Primary,
                    attempts: 1,
                    latency: started.elapsed(),
                })
            }
            Err(e) => e,
        };

        warn!(
            "Primary provider ({}) failed: {primary_err} — trying backup",
            slot_label(primary)
        );

        match self.attempt(request, backup).await {
            Ok(text) => {
                info!(
                    "Backup provider ({}) answered after primary failure",
                    slot_label(backup)
                );
                Ok(CompletionResult {
                    text,
                    provider_used: ProviderRole::Secondary,
                    attempts: 2,
                    latency: started.elapsed(),
                })
            }
            Err(backup_err) => {
                warn!(
                    "Backup provider ({}) failed: {backup_err}",
                    slot_label(backup)
                );
                Err(ProviderExhausted {
                    primary: primary_err,
                    backup: backup_err,
                })
            }
        }
    }

    async fn attempt(
        &self,
        request: &CompletionRequest,
        backend: Option<&dyn CompletionBackend>,
    ) -> Result<String, ProviderFailure> {
        let Some(backend) = backend else {
            return Err(ProviderFailure::Disabled);
        };
        match tokio::time::timeout(self.attempt_timeout, backend.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderFailure::Timeout {
                limit: self.attempt_timeout,
            }),
        }
    }
}

fn slot_label(backend: Option<&dyn CompletionBackend>) -> &'static str {
    backend.map(|b| b.name()).unwrap_or("unconfigured")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    enum MockBehavior {
        Respond(&'static str),
        Fail,
        Hang,
    }

    struct MockBackend {
        name: &'static str,
        behavior: MockBehavior,
        calls: AtomicU32,
    }

    impl MockBackend {
        fn new(name: &'static str, behavior: MockBehavior) -> Self {
            Self {
                name,
                behavior,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for MockBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                MockBehavior::Respond(text) => Ok(text.to_string()),
                MockBehavior::Fail => Err(ProviderFailure::Api {
                    status: 429,
                    message: "rate limited".to_string(),
                }),
                MockBehavior::Hang => std::future::pending().await,
            }
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::from_prompt("prompt".to_string(), None)
    }

    fn gateway() -> CompletionGateway {
        CompletionGateway::new(Duration::from_secs(20))
    }

    #[tokio::test]
    async fn test_primary_success_never_touches_backup() {
        let primary = MockBackend::new("claude", MockBehavior::Respond("ok"));
        let backup = MockBackend::new("gemini", MockBehavior::Respond("unused"));

        let result = gateway()
            .complete(&request(), Some(&primary), Some(&backup))
            .await
            .unwrap();

        assert_eq!(result.text, "ok");
        assert_eq!(result.provider_used, ProviderRole::Primary);
        assert_eq!(result.attempts, 1);
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_invokes_backup_exactly_once() {
        let primary = MockBackend::new("claude", MockBehavior::Fail);
        let backup = MockBackend::new("gemini", MockBehavior::Respond("rescued"));

        let result = gateway()
            .complete(&request(), Some(&primary), Some(&backup))
            .await
            .unwrap();

        assert_eq!(result.text, "rescued");
        assert_eq!(result.provider_used, ProviderRole::Secondary);
        assert_eq!(result.attempts, 2);
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_failures_surface_as_exhausted_with_causes() {
        let primary = MockBackend::new("claude", MockBehavior::Fail);
        let backup = MockBackend::new("gemini", MockBehavior::Fail);

        let err = gateway()
            .complete(&request(), Some(&primary), Some(&backup))
            .await
            .unwrap_err();

        assert!(matches!(err.primary, ProviderFailure::Api { status: 429, .. }));
        assert!(matches!(err.backup, ProviderFailure::Api { status: 429, .. }));
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 1);
    }

    #[tokio::test]
    async fn test_disabled_primary_is_prefailed_without_attempt() {
        let backup = MockBackend::new("gemini", MockBehavior::Respond("solo"));

        let result = gateway()
            .complete(&request(), None, Some(&backup))
            .await
            .unwrap();

        assert_eq!(result.provider_used, ProviderRole::Secondary);
        assert_eq!(backup.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_disabled_exhausts_immediately() {
        let err = gateway()
            .complete(&request(), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err.primary, ProviderFailure::Disabled));
        assert!(matches!(err.backup, ProviderFailure::Disabled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_primary_times_out_and_backup_rescues() {
        let primary = MockBackend::new("claude", MockBehavior::Hang);
        let backup = MockBackend::new("gemini", MockBehavior::Respond("rescued"));

        let result = gateway()
            .complete(&request(), Some(&primary), Some(&backup))
            .await
            .unwrap();

        assert_eq!(result.provider_used, ProviderRole::Secondary);
        assert_eq!(result.text, "rescued");
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_both_reports_timeout_causes() {
        let primary = MockBackend::new("claude", MockBehavior::Hang);
        let backup = MockBackend::new("gemini", MockBehavior::Hang);

        let err = gateway()
            .complete(&request(), Some(&primary), Some(&backup))
            .await
            .unwrap_err();

        assert!(matches!(err.primary, ProviderFailure::Timeout { .. }));
        assert!(matches!(err.backup, ProviderFailure::Timeout { .. }));
    }
}
