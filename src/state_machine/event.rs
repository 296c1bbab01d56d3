//! Triggers that drive the journey

use crate::backend::{AnalysisReply, BackendError};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User triggers
    UserMessage { text: String },
    SelectTrend { id: u32 },
    SelectIdea { id: u32 },
    BuildRequested,
    Reset,

    // Generated by the runtime
    AnalysisComplete { reply: AnalysisReply },
    AnalysisFailed { error: BackendError },
    /// Follows the build automatically
    RunTests,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserMessage { .. } => "user_message",
            Event::SelectTrend { .. } => "select_trend",
            Event::SelectIdea { .. } => "select_idea",
            Event::BuildRequested => "build_requested",
            Event::Reset => "reset",
            Event::AnalysisComplete { .. } => "analysis_complete",
            Event::AnalysisFailed { .. } => "analysis_failed",
            Event::RunTests => "run_tests",
        }
    }

    /// Triggers a user can send; rejected while the assistant is typing
    pub fn is_user_trigger(&self) -> bool {
        matches!(
            self,
            Event::UserMessage { .. }
                | Event::SelectTrend { .. }
                | Event::SelectIdea { .. }
                | Event::BuildRequested
        )
    }
}
