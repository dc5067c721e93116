//! Static analysis task table with the cross-backup provider assignment.
//!
//! Each provider is primary for one task and backup for the other, so a
//! single-provider outage never disables both analyses. Constructed once,
//! immutable for the life of the process.

use crate::analysis::prompts;
use crate::models::content::ContentData;
use crate::models::report::TaskKind;

/// One of the two configured provider slots.
/// A = chat-style backend, B = single-prompt backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSlot {
    A,
    B,
}

pub const BUSINESS_REQUIRED_KEYS: &[&str] = &[
    "analysis_summary",
    "key_topics",
    "brand_tone",
    "target_audience",
    "main_services",
    "content_suggestions",
];

pub const STORYTELLING_REQUIRED_KEYS: &[&str] = &[
    "story_summary",
    "narrative_themes",
    "emotional_tone",
    "brand_personality",
    "storytelling_hooks",
    "content_suggestions",
];

/// Static configuration for one analysis task.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisTask {
    pub kind: TaskKind,
    pub primary: ProviderSlot,
    pub backup: ProviderSlot,
    /// Keys a structured result MUST contain — real or synthesized.
    pub required_keys: &'static [&'static str],
}

/// The cross-backup task table.
pub static TASKS: [AnalysisTask; 2] = [
    AnalysisTask {
        kind: TaskKind::Business,
        primary: ProviderSlot::A,
        backup: ProviderSlot::B,
        required_keys: BUSINESS_REQUIRED_KEYS,
    },
    AnalysisTask {
        kind: TaskKind::Storytelling,
        primary: ProviderSlot::B,
        backup: ProviderSlot::A,
        required_keys: STORYTELLING_REQUIRED_KEYS,
    },
];

impl AnalysisTask {
    pub fn system(&self) -> &'static str {
        match self.kind {
            TaskKind::Business => prompts::BUSINESS_SYSTEM,
            TaskKind::Storytelling => prompts::STORYTELLING_SYSTEM,
        }
    }

    pub fn build_prompt(&self, content: &ContentData, url: &str) -> String {
        match self.kind {
            TaskKind::Business => prompts::build_business_prompt(content, url),
            TaskKind::Storytelling => prompts::build_storytelling_prompt(content, url),
        }
    }
}
