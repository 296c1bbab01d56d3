//! Typed payloads attached to conversation messages

use crate::state_machine::Stage;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A market trend surfaced by the analysis step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub id: u32,
    pub title: String,
    pub score: f64,
    pub momentum: u8,
    pub pain: u8,
    pub competition: u8,
    pub build: u8,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl Trend {
    /// Raw opportunity index: `(momentum × 2) + (pain × 3) − competition − build`
    pub fn opportunity_index(&self) -> i32 {
        i32::from(self.momentum) * 2 + i32::from(self.pain) * 3
            - i32::from(self.competition)
            - i32::from(self.build)
    }
}

/// Order trends by score, highest first; equal scores fall back to the
/// opportunity index.
pub fn rank_trends(mut trends: Vec<Trend>) -> Vec<Trend> {
    trends.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.opportunity_index().cmp(&a.opportunity_index()))
    });
    trends
}

/// A startup idea derived from the selected trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: u32,
    pub title: String,
    pub concept: String,
    pub target_user: String,
    #[serde(default)]
    pub advantages: Vec<String>,
    /// Why the idea ranks where it does given the user's past decisions
    #[serde(default, alias = "acontextReasoning")]
    pub memory_reasoning: String,
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLog {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProgress {
    pub logs: Vec<BuildLog>,
    /// Completion percentage, 0..=100
    pub progress: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub name: String,
    pub status: StepStatus,
    pub screenshot: String,
    #[serde(default)]
    pub checks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub passed: u32,
    pub failed: u32,
    pub execution_time: String,
    pub browser: String,
    pub steps: Vec<TestStep>,
}

/// Structured payload rendered by the UI under a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Embed {
    Trends(Vec<Trend>),
    Ideas(Vec<Idea>),
    Proposal(Vec<ProposalSection>),
    BuildProgress(BuildProgress),
    TestReport(TestReport),
}

impl Embed {
    pub fn kind(&self) -> EmbedKind {
        match self {
            Embed::Trends(_) => EmbedKind::Trends,
            Embed::Ideas(_) => EmbedKind::Ideas,
            Embed::Proposal(_) => EmbedKind::Proposal,
            Embed::BuildProgress(_) => EmbedKind::BuildProgress,
            Embed::TestReport(_) => EmbedKind::TestReport,
        }
    }

    /// Decode an embed from the loose `(embedType, embedData)` pair the
    /// analysis backend sends.
    pub fn from_parts(kind: &str, data: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json!({ "type": kind, "data": data }))
    }
}

/// Tag of an [`Embed`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedKind {
    Trends,
    Ideas,
    Proposal,
    BuildProgress,
    TestReport,
}

impl EmbedKind {
    /// The stage whose entering transition produces this embed
    pub fn stage(self) -> Stage {
        match self {
            EmbedKind::Trends => Stage::Trends,
            EmbedKind::Ideas => Stage::Ideas,
            EmbedKind::Proposal => Stage::Proposal,
            EmbedKind::BuildProgress => Stage::Build,
            EmbedKind::TestReport => Stage::Test,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmbedKind::Trends => "trends",
            EmbedKind::Ideas => "ideas",
            EmbedKind::Proposal => "proposal",
            EmbedKind::BuildProgress => "build-progress",
            EmbedKind::TestReport => "test-report",
        }
    }
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
