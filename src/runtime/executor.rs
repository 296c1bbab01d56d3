//! Session runtime executor

use super::{SessionCommand, TurnControl};
use crate::backend::{AnalysisBackend, AnalysisReply, AnalysisRequest};
use crate::conversation::ConversationStore;
use crate::state_machine::{transition, Effect, Event, SessionContext, Stage, TransitionError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What a finished turn left behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub stage: Stage,
    /// The turn hit the backend error path
    pub error: bool,
    /// The turn was stopped by a reset before all effects ran
    pub cancelled: bool,
}

/// Marker for a turn stopped at a delay
#[derive(Debug)]
struct TurnCancelled;

/// Drives one session: runs accepted transitions' effects against the store
pub struct Orchestrator<B: AnalysisBackend> {
    context: SessionContext,
    store: ConversationStore,
    backend: B,
}

impl<B: AnalysisBackend> Orchestrator<B> {
    pub fn new(context: SessionContext, store: ConversationStore, backend: B) -> Self {
        Self {
            context,
            store,
            backend,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Run a trigger and everything it generates to completion.
    ///
    /// Returns the transition error if the trigger itself is rejected; the
    /// store is untouched in that case.
    pub async fn dispatch(
        &self,
        event: Event,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, TransitionError> {
        let session_id = &self.context.session_id;
        let trigger = event.name();
        let result = transition(&self.store.snapshot(), &self.context, event)?;
        tracing::debug!(session_id = %session_id, trigger, next = %result.next_stage, "Trigger accepted");

        let mut effects: VecDeque<Effect> = result.effects.into();
        let mut error = false;

        while let Some(effect) = effects.pop_front() {
            if cancel.is_cancelled() {
                return Ok(self.cancelled_outcome(error));
            }

            if matches!(effect, Effect::ReportError { .. }) {
                error = true;
            }

            let generated = match self.execute_effect(effect, cancel).await {
                Ok(generated) => generated,
                Err(TurnCancelled) => return Ok(self.cancelled_outcome(error)),
            };

            // Generated events are internal and always valid for the stage they
            // arrive in; a rejection here means the store was changed under us.
            if let Some(event) = generated {
                let trigger = event.name();
                match transition(&self.store.snapshot(), &self.context, event) {
                    Ok(result) => effects.extend(result.effects),
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, trigger, error = %e, "Generated event rejected");
                        self.store.report_error(e.to_string());
                        self.store.set_typing(false);
                        error = true;
                    }
                }
            }
        }

        let stage = self.store.stage();
        tracing::info!(session_id = %session_id, stage = %stage, error, "Turn complete");
        Ok(DispatchOutcome {
            stage,
            error,
            cancelled: false,
        })
    }

    fn cancelled_outcome(&self, error: bool) -> DispatchOutcome {
        tracing::info!(session_id = %self.context.session_id, "Turn cancelled");
        self.store.set_typing(false);
        DispatchOutcome {
            stage: self.store.stage(),
            error,
            cancelled: true,
        }
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(
        &self,
        effect: Effect,
        cancel: &CancellationToken,
    ) -> Result<Option<Event>, TurnCancelled> {
        match effect {
            Effect::AppendMessage {
                role,
                content,
                embed,
            } => {
                self.store.append_message(role, content, embed);
                Ok(None)
            }

            Effect::SelectTrend { id } => {
                self.store.select_trend(id);
                Ok(None)
            }

            Effect::SelectIdea { id } => {
                self.store.select_idea(id);
                Ok(None)
            }

            Effect::SetStage { stage } => {
                self.store.set_stage(stage);
                Ok(None)
            }

            Effect::SetTyping { is_typing } => {
                self.store.set_typing(is_typing);
                Ok(None)
            }

            Effect::Delay { duration } => {
                sleep(duration, cancel).await?;
                Ok(None)
            }

            Effect::RequestAnalysis { message, stage } => {
                let request = AnalysisRequest { message, stage };
                let result = tokio::select! {
                    result = self.backend.analyze(&request) => result,
                    () = cancel.cancelled() => return Err(TurnCancelled),
                };

                let event = match result.and_then(|reply| reply.validate_for(stage)) {
                    Ok(reply) => Event::AnalysisComplete { reply },
                    Err(e) if e.kind.has_fallback() => {
                        tracing::debug!(session_id = %self.context.session_id, "Using scripted analysis");
                        Event::AnalysisComplete {
                            reply: AnalysisReply::scripted(),
                        }
                    }
                    Err(error) => Event::AnalysisFailed { error },
                };
                Ok(Some(event))
            }

            Effect::ReportError { message } => {
                tracing::warn!(session_id = %self.context.session_id, error = %message, "Turn failed");
                self.store.report_error(message);
                Ok(None)
            }

            Effect::ScheduleTests { delay } => {
                sleep(delay, cancel).await?;
                Ok(Some(Event::RunTests))
            }

            Effect::ResetStore => {
                self.store.reset();
                Ok(None)
            }
        }
    }
}

async fn sleep(duration: Duration, cancel: &CancellationToken) -> Result<(), TurnCancelled> {
    if duration.is_zero() {
        return Ok(());
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => Ok(()),
        () = cancel.cancelled() => Err(TurnCancelled),
    }
}

// ============================================================================
// Session loop
// ============================================================================

/// One task per session; triggers are run one at a time in arrival order
pub struct SessionRuntime<B: AnalysisBackend> {
    orchestrator: Orchestrator<B>,
    command_rx: mpsc::Receiver<SessionCommand>,
    turns: Arc<Mutex<TurnControl>>,
}

impl<B: AnalysisBackend> SessionRuntime<B> {
    pub fn new(
        orchestrator: Orchestrator<B>,
        command_rx: mpsc::Receiver<SessionCommand>,
        turns: Arc<Mutex<TurnControl>>,
    ) -> Self {
        Self {
            orchestrator,
            command_rx,
            turns,
        }
    }

    pub async fn run(mut self) {
        let session_id = self.orchestrator.context.session_id.clone();
        tracing::info!(session_id = %session_id, "Starting session runtime");

        while let Some(SessionCommand {
            event,
            epoch,
            reply,
        }) = self.command_rx.recv().await
        {
            let started = self
                .turns
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .start_turn(epoch);

            let result = match started {
                Some(cancel) => self.orchestrator.dispatch(event, &cancel).await,
                None => {
                    tracing::debug!(session_id = %session_id, trigger = event.name(), "Dropping trigger queued before reset");
                    Ok(DispatchOutcome {
                        stage: self.orchestrator.store().stage(),
                        error: false,
                        cancelled: true,
                    })
                }
            };
            match &result {
                Ok(outcome) => tracing::debug!(
                    session_id = %session_id,
                    stage = %outcome.stage,
                    error = outcome.error,
                    cancelled = outcome.cancelled,
                    "Turn finished"
                ),
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Trigger rejected");
                    self.orchestrator.store().report_error(e.to_string());
                }
            }

            if let Some(reply) = reply {
                // Caller may have stopped waiting
                let _ = reply.send(result);
            }
        }

        tracing::info!(session_id = %session_id, "Session runtime stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::conversation::{Embed, EmbedKind, MessageRole, StoreEvent};
    use crate::runtime::testing::{MockAnalysisBackend, PendingBackend};
    use crate::script;
    use crate::state_machine::ScriptTiming;

    fn orchestrator<B: AnalysisBackend>(backend: B) -> Orchestrator<B> {
        Orchestrator::new(
            SessionContext::new("test-session", ScriptTiming::instant()),
            ConversationStore::new(),
            backend,
        )
    }

    fn embed_kinds(store: &ConversationStore) -> Vec<EmbedKind> {
        store
            .snapshot()
            .messages
            .iter()
            .filter_map(|m| m.embed().map(Embed::kind))
            .collect()
    }

    async fn send(orch: &Orchestrator<impl AnalysisBackend>, event: Event) -> DispatchOutcome {
        orch.dispatch(event, &CancellationToken::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_backend_trends_advance_stage() {
        let backend = MockAnalysisBackend::new();
        backend.queue_reply(AnalysisReply {
            message: "Here is what I found".to_string(),
            stage: Stage::Trends,
            embed: Some(Embed::Trends(script::trends())),
        });
        let orch = orchestrator(backend);

        let outcome = send(
            &orch,
            Event::UserMessage {
                text: "AI tools for nurses".to_string(),
            },
        )
        .await;

        assert_eq!(outcome.stage, Stage::Trends);
        assert!(!outcome.error);

        let state = orch.store().snapshot();
        let last = state.messages.last().unwrap();
        assert_eq!(last.role(), MessageRole::Assistant);
        assert_eq!(last.content(), "Here is what I found");
        assert!(matches!(last.embed(), Some(Embed::Trends(t)) if t.len() == 5));
        assert!(!state.is_typing);

        let requests = orch.backend.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "AI tools for nurses");
        assert_eq!(requests[0].stage, Stage::Input);
    }

    #[tokio::test]
    async fn test_backend_failure_apologises() {
        let backend = MockAnalysisBackend::new();
        backend.queue_error(BackendError::unavailable("connection refused"));
        let orch = orchestrator(backend);
        let mut events = orch.store().subscribe();

        let outcome = send(
            &orch,
            Event::UserMessage {
                text: "x".to_string(),
            },
        )
        .await;

        assert_eq!(outcome.stage, Stage::Input);
        assert!(outcome.error);

        let state = orch.store().snapshot();
        let last = state.messages.last().unwrap();
        assert_eq!(last.content(), script::BACKEND_APOLOGY);
        assert!(last.embed().is_none());
        assert!(!state.is_typing);

        let mut saw_error = false;
        while let Ok(event) = events.try_recv() {
            if let StoreEvent::Error { message } = event {
                assert_eq!(message, "connection refused");
                saw_error = true;
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_invalid_reply_stage_is_failure() {
        let backend = MockAnalysisBackend::new();
        backend.queue_reply(AnalysisReply {
            message: "skipping ahead".to_string(),
            stage: Stage::Build,
            embed: None,
        });
        let orch = orchestrator(backend);

        let outcome = send(
            &orch,
            Event::UserMessage {
                text: "x".to_string(),
            },
        )
        .await;

        assert!(outcome.error);
        assert_eq!(outcome.stage, Stage::Input);
    }

    #[tokio::test]
    async fn test_full_scripted_journey() {
        // Empty mock queue reports not configured, so the script is used
        let orch = orchestrator(MockAnalysisBackend::new());

        send(
            &orch,
            Event::UserMessage {
                text: "developer tools".to_string(),
            },
        )
        .await;
        assert_eq!(orch.store().stage(), Stage::Trends);

        let trend = orch.store().snapshot().offered_trend_ids()[0];
        send(&orch, Event::SelectTrend { id: trend }).await;
        assert_eq!(orch.store().stage(), Stage::Ideas);

        let idea = orch.store().snapshot().offered_idea_ids()[0];
        send(&orch, Event::SelectIdea { id: idea }).await;
        assert_eq!(orch.store().stage(), Stage::Proposal);

        let outcome = send(&orch, Event::BuildRequested).await;
        assert_eq!(outcome.stage, Stage::Test);

        assert_eq!(
            embed_kinds(orch.store()),
            vec![
                EmbedKind::Trends,
                EmbedKind::Ideas,
                EmbedKind::Proposal,
                EmbedKind::BuildProgress,
                EmbedKind::TestReport,
            ]
        );

        let state = orch.store().snapshot();
        assert_eq!(state.selected_trend_id, Some(trend));
        assert_eq!(state.selected_idea_id, Some(idea));
        assert!(!state.is_typing);
    }

    #[tokio::test]
    async fn test_rejected_trigger_leaves_store_alone() {
        let orch = orchestrator(MockAnalysisBackend::new());
        let before = orch.store().snapshot();

        let err = orch
            .dispatch(Event::BuildRequested, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
        assert_eq!(orch.store().snapshot(), before);
    }

    #[tokio::test]
    async fn test_cancel_stops_pending_analysis() {
        let orch = Arc::new(orchestrator(PendingBackend));
        let cancel = CancellationToken::new();

        let task = {
            let orch = Arc::clone(&orch);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                orch.dispatch(
                    Event::UserMessage {
                        text: "x".to_string(),
                    },
                    &cancel,
                )
                .await
            })
        };

        // Wait until the scan has been announced before cancelling
        while orch.store().snapshot().messages.len() < 1 + 1 + script::STATUS_LINES.len() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        cancel.cancel();

        let outcome = task.await.unwrap().unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.stage, Stage::Input);
        assert!(!orch.store().is_typing());
    }

    #[tokio::test]
    async fn test_not_configured_is_not_an_error() {
        let backend = MockAnalysisBackend::new();
        backend.queue_error(BackendError::not_configured("no url"));
        let orch = orchestrator(backend);

        let outcome = send(
            &orch,
            Event::UserMessage {
                text: "x".to_string(),
            },
        )
        .await;
        assert!(!outcome.error);
        assert_eq!(outcome.stage, Stage::Trends);
        assert_eq!(
            orch.store().snapshot().messages.last().unwrap().content(),
            script::TRENDS_SUMMARY
        );
    }
}
