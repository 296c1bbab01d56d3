//! Conversation state types

use crate::conversation::{Embed, Message};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Stage
// ============================================================================

/// Position in the fixed journey. Ordering follows the progression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Input,
    Trends,
    Ideas,
    Proposal,
    Build,
    Test,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::Input,
        Stage::Trends,
        Stage::Ideas,
        Stage::Proposal,
        Stage::Build,
        Stage::Test,
    ];

    /// The only stage a transition out of `self` may land in
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Input => Some(Stage::Trends),
            Stage::Trends => Some(Stage::Ideas),
            Stage::Ideas => Some(Stage::Proposal),
            Stage::Proposal => Some(Stage::Build),
            Stage::Build => Some(Stage::Test),
            Stage::Test => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Trends => "trends",
            Stage::Ideas => "ideas",
            Stage::Proposal => "proposal",
            Stage::Build => "build",
            Stage::Test => "test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ORDER
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Everything the UI renders for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub stage: Stage,
    pub selected_trend_id: Option<u32>,
    pub selected_idea_id: Option<u32>,
    pub is_typing: bool,
}

impl ConversationState {
    /// Trend ids offered by the most recent trends embed
    pub fn offered_trend_ids(&self) -> Vec<u32> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| match m.embed() {
                Some(Embed::Trends(trends)) => Some(trends.iter().map(|t| t.id).collect()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Idea ids offered by the most recent ideas embed
    pub fn offered_idea_ids(&self) -> Vec<u32> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| match m.embed() {
                Some(Embed::Ideas(ideas)) => Some(ideas.iter().map(|i| i.id).collect()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Scales every scripted pause. 100 is real time, 0 makes the script instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptTiming {
    pub scale_percent: u32,
}

impl Default for ScriptTiming {
    fn default() -> Self {
        Self { scale_percent: 100 }
    }
}

impl ScriptTiming {
    pub fn instant() -> Self {
        Self { scale_percent: 0 }
    }

    pub fn scaled(self, millis: u64) -> Duration {
        Duration::from_millis(millis.saturating_mul(u64::from(self.scale_percent)) / 100)
    }
}

/// Immutable per-session configuration
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub timing: ScriptTiming,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, timing: ScriptTiming) -> Self {
        Self {
            session_id: session_id.into(),
            timing,
        }
    }
}
