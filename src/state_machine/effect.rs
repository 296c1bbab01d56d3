//! Effects produced by state transitions

use super::state::Stage;
use crate::conversation::{Embed, MessageRole};
use std::time::Duration;

/// Effects to be executed, in order, after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the log
    AppendMessage {
        role: MessageRole,
        content: String,
        embed: Option<Embed>,
    },

    /// Record the chosen trend (and its announcement message)
    SelectTrend { id: u32 },

    /// Record the chosen idea (and its announcement message)
    SelectIdea { id: u32 },

    SetStage { stage: Stage },

    SetTyping { is_typing: bool },

    /// Simulated thinking time
    Delay { duration: Duration },

    /// Ask the analysis backend; produces `AnalysisComplete` or `AnalysisFailed`
    RequestAnalysis { message: String, stage: Stage },

    /// Tell the caller this turn ended in an error
    ReportError { message: String },

    /// Produce a `RunTests` event after the delay
    ScheduleTests { delay: Duration },

    /// Clear the store back to its initial state
    ResetStore,
}

impl Effect {
    pub fn user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: MessageRole::User,
            content: content.into(),
            embed: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: MessageRole::System,
            content: content.into(),
            embed: None,
        }
    }

    pub fn assistant(content: impl Into<String>, embed: Option<Embed>) -> Self {
        Effect::AppendMessage {
            role: MessageRole::Assistant,
            content: content.into(),
            embed,
        }
    }

    pub fn delay(duration: Duration) -> Self {
        Effect::Delay { duration }
    }

    pub fn typing(is_typing: bool) -> Self {
        Effect::SetTyping { is_typing }
    }

    pub fn stage(stage: Stage) -> Self {
        Effect::SetStage { stage }
    }
}
