//! Pure state transition function
//!
//! Given the current conversation state and a trigger, decide the ordered
//! effects to run and the stage the conversation lands in. Each stage accepts
//! one user trigger plus the internal events that trigger generates, and
//! `Reset` is accepted everywhere. Every other pair is rejected.

use super::{ConversationState, Effect, Event, SessionContext, Stage};
use crate::conversation::{Embed, EmbedKind};
use crate::script;
use thiserror::Error;

// Scripted pauses, in milliseconds at real-time scale
const ACK_DELAY_MS: u64 = 1000;
const SUMMARY_DELAY_MS: u64 = 800;
const IDEAS_DELAY_MS: u64 = 1500;
const PROPOSAL_DELAY_MS: u64 = 2000;
const BUILD_ACK_DELAY_MS: u64 = 1000;
const BUILD_RUN_DELAY_MS: u64 = 3000;
const TESTS_FOLLOW_UP_DELAY_MS: u64 = 1000;
const TESTS_RUN_DELAY_MS: u64 = 2000;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    /// Stage the conversation is in once every effect has run
    pub next_stage: Stage,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(next_stage: Stage) -> Self {
        Self {
            next_stage,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Assistant is busy, wait for the current step to finish")]
    Busy,
    #[error("Unknown {kind} id {id}")]
    UnknownSelection { kind: &'static str, id: u32 },
    #[error("Invalid transition: {trigger} is not accepted in stage {stage}")]
    InvalidTransition { stage: Stage, trigger: &'static str },
}

/// Pure transition function. No I/O; the runtime executes the effects.
#[allow(clippy::too_many_lines)] // One arm per row of the journey table
pub fn transition(
    state: &ConversationState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if state.is_typing && event.is_user_trigger() {
        return Err(TransitionError::Busy);
    }

    let timing = context.timing;

    match (state.stage, event) {
        // Reset is accepted from anywhere
        (_, Event::Reset) => Ok(TransitionResult::new(Stage::Input).with_effect(Effect::ResetStore)),

        // ============================================================
        // input: trend scan
        // ============================================================
        (Stage::Input, Event::UserMessage { text }) => {
            let mut effects = vec![
                Effect::user(text.clone()),
                Effect::typing(true),
                Effect::delay(timing.scaled(ACK_DELAY_MS)),
                Effect::system(script::ANALYSIS_STARTED),
            ];

            for line in script::STATUS_LINES {
                effects.push(Effect::delay(timing.scaled(line.delay_ms)));
                effects.push(Effect::system(line.render()));
            }

            effects.push(Effect::delay(timing.scaled(SUMMARY_DELAY_MS)));
            effects.push(Effect::RequestAnalysis {
                message: text,
                stage: Stage::Input,
            });

            Ok(TransitionResult::new(Stage::Input).with_effects(effects))
        }

        (Stage::Input, Event::AnalysisComplete { reply }) => match reply.stage {
            Stage::Trends => {
                // A reply that advances must offer trends to choose from
                let embed = reply
                    .embed
                    .filter(|e| e.kind() == EmbedKind::Trends)
                    .unwrap_or_else(|| Embed::Trends(script::trends()));
                Ok(TransitionResult::new(Stage::Trends).with_effects([
                    Effect::assistant(reply.message, Some(embed)),
                    Effect::stage(Stage::Trends),
                    Effect::typing(false),
                ]))
            }
            Stage::Input => Ok(TransitionResult::new(Stage::Input).with_effects([
                Effect::assistant(reply.message, None),
                Effect::typing(false),
            ])),
            other => Ok(analysis_failed(format!(
                "Backend moved stage from input to {other}"
            ))),
        },

        (Stage::Input, Event::AnalysisFailed { error }) => Ok(analysis_failed(error.message)),

        // ============================================================
        // trends -> ideas
        // ============================================================
        (Stage::Trends, Event::SelectTrend { id }) => {
            if !state.offered_trend_ids().contains(&id) {
                return Err(TransitionError::UnknownSelection { kind: "trend", id });
            }
            Ok(TransitionResult::new(Stage::Ideas).with_effects([
                Effect::SelectTrend { id },
                Effect::typing(true),
                Effect::delay(timing.scaled(IDEAS_DELAY_MS)),
                Effect::assistant(script::IDEAS_INTRO, Some(Embed::Ideas(script::ideas()))),
                Effect::stage(Stage::Ideas),
                Effect::typing(false),
            ]))
        }

        // ============================================================
        // ideas -> proposal
        // ============================================================
        (Stage::Ideas, Event::SelectIdea { id }) => {
            if !state.offered_idea_ids().contains(&id) {
                return Err(TransitionError::UnknownSelection { kind: "idea", id });
            }
            Ok(TransitionResult::new(Stage::Proposal).with_effects([
                Effect::SelectIdea { id },
                Effect::typing(true),
                Effect::delay(timing.scaled(PROPOSAL_DELAY_MS)),
                Effect::assistant(
                    script::PROPOSAL_INTRO,
                    Some(Embed::Proposal(script::proposal())),
                ),
                Effect::stage(Stage::Proposal),
                Effect::typing(false),
            ]))
        }

        // ============================================================
        // proposal -> build, then tests follow on their own
        // ============================================================
        (Stage::Proposal, Event::BuildRequested) => {
            Ok(TransitionResult::new(Stage::Build).with_effects([
                Effect::user(script::BUILD_REQUEST),
                Effect::typing(true),
                Effect::delay(timing.scaled(BUILD_ACK_DELAY_MS)),
                Effect::assistant(
                    script::BUILD_STARTED,
                    Some(Embed::BuildProgress(script::build_progress())),
                ),
                Effect::delay(timing.scaled(BUILD_RUN_DELAY_MS)),
                Effect::stage(Stage::Build),
                Effect::typing(false),
                Effect::ScheduleTests {
                    delay: timing.scaled(TESTS_FOLLOW_UP_DELAY_MS),
                },
            ]))
        }

        (Stage::Build, Event::RunTests) => Ok(TransitionResult::new(Stage::Test).with_effects([
            Effect::user(script::TEST_REQUEST),
            Effect::typing(true),
            Effect::delay(timing.scaled(TESTS_RUN_DELAY_MS)),
            Effect::assistant(
                script::TESTS_PASSED,
                Some(Embed::TestReport(script::test_report())),
            ),
            Effect::stage(Stage::Test),
            Effect::typing(false),
        ])),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (stage, event) => Err(TransitionError::InvalidTransition {
            stage,
            trigger: event.name(),
        }),
    }
}

/// The input stage's error path: apologise, stay put, report the failure
fn analysis_failed(detail: String) -> TransitionResult {
    TransitionResult::new(Stage::Input).with_effects([
        Effect::assistant(script::BACKEND_APOLOGY, None),
        Effect::typing(false),
        Effect::ReportError { message: detail },
    ])
}
