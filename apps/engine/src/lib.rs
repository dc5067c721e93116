//! Website analysis engine — resilient dual-provider marketing analysis.
//!
//! Turns scraped website content into structured business and storytelling
//! analysis by calling two independent LLM providers with cross-assigned
//! primary/backup roles, bounded per-attempt and overall deadlines,
//! response-shape validation and guaranteed-success offline synthesis.
//! The HTTP layer consumes `DualAnalysisOrchestrator::analyze` and
//! serializes the report into the public API response; provider outages
//! never surface to it as errors.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod providers;

pub use analysis::orchestrator::{DualAnalysisOrchestrator, OrchestratorSettings};
pub use config::EngineConfig;
pub use errors::{ProviderExhausted, ProviderFailure, ValidationError};
pub use gateway::CompletionGateway;
pub use models::content::ContentData;
pub use models::report::{AnalysisOutcome, TaskKind, WebsiteAnalysisReport};
pub use providers::{CompletionBackend, CompletionRequest, CompletionResult, ProviderRole};
