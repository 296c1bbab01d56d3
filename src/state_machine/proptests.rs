//! Property-based tests for the state machine
//!
//! Events are fed through `transition` and the resulting effects applied to a
//! real store synchronously (delays skipped, follow-up events fed back in).

use super::*;
use crate::backend::{AnalysisReply, BackendError};
use crate::conversation::{ConversationStore, Embed};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("test-session", ScriptTiming::instant())
}

/// Apply effects the way the executor does, minus the waiting
fn apply(store: &ConversationStore, effects: Vec<Effect>) {
    for effect in effects {
        let follow_up = match effect {
            Effect::AppendMessage {
                role,
                content,
                embed,
            } => {
                store.append_message(role, content, embed);
                None
            }
            Effect::SelectTrend { id } => {
                store.select_trend(id);
                None
            }
            Effect::SelectIdea { id } => {
                store.select_idea(id);
                None
            }
            Effect::SetStage { stage } => {
                store.set_stage(stage);
                None
            }
            Effect::SetTyping { is_typing } => {
                store.set_typing(is_typing);
                None
            }
            Effect::RequestAnalysis { .. } => Some(Event::AnalysisComplete {
                reply: AnalysisReply::scripted(),
            }),
            Effect::ScheduleTests { .. } => Some(Event::RunTests),
            Effect::ResetStore => {
                store.reset();
                None
            }
            Effect::Delay { .. } | Effect::ReportError { .. } => None,
        };

        if let Some(event) = follow_up {
            let result = transition(&store.snapshot(), &test_context(), event)
                .expect("follow-up events are always accepted");
            apply(store, result.effects);
        }
    }
}

fn embed_kinds(state: &ConversationState) -> Vec<Stage> {
    state
        .messages
        .iter()
        .filter_map(|m| m.embed().map(|e| e.kind().stage()))
        .collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(|text| Event::UserMessage { text }),
        (0u32..8).prop_map(|id| Event::SelectTrend { id }),
        (0u32..8).prop_map(|id| Event::SelectIdea { id }),
        Just(Event::BuildRequested),
        Just(Event::RunTests),
        Just(Event::AnalysisComplete {
            reply: AnalysisReply::scripted()
        }),
        Just(Event::AnalysisFailed {
            error: BackendError::unavailable("down")
        }),
        Just(Event::Reset),
    ]
}

fn arb_stage() -> impl Strategy<Value = Stage> {
    proptest::sample::select(Stage::ORDER.to_vec())
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Stage moves forward one step at a time; only reset goes back
    #[test]
    fn prop_stage_never_regresses(events in proptest::collection::vec(arb_event(), 0..30)) {
        let store = ConversationStore::new();
        let ctx = test_context();

        for event in events {
            let before = store.stage();
            let is_reset = matches!(event, Event::Reset);

            if let Ok(result) = transition(&store.snapshot(), &ctx, event) {
                apply(&store, result.effects);
                let after = store.stage();
                if is_reset {
                    prop_assert_eq!(after, Stage::Input);
                    prop_assert!(store.snapshot().messages.is_empty());
                } else {
                    // The build step chains into tests, so allow two steps from proposal
                    prop_assert!(after >= before, "{} regressed to {}", before, after);
                    prop_assert!(
                        after == before
                            || before.next() == Some(after)
                            || (before == Stage::Proposal && after == Stage::Test),
                        "{} jumped to {}",
                        before,
                        after
                    );
                }
            }
        }
    }

    // A trend is picked only from the trends stage, an idea only from ideas
    #[test]
    fn prop_selection_only_in_its_stage(events in proptest::collection::vec(arb_event(), 0..30)) {
        let store = ConversationStore::new();
        let ctx = test_context();

        for event in events {
            let before = store.snapshot();
            if let Ok(result) = transition(&before, &ctx, event) {
                apply(&store, result.effects);
            }
            let after = store.snapshot();

            if before.selected_trend_id.is_none() && after.selected_trend_id.is_some() {
                prop_assert_eq!(before.stage, Stage::Trends);
            }
            if before.selected_idea_id.is_none() && after.selected_idea_id.is_some() {
                prop_assert_eq!(before.stage, Stage::Ideas);
            }
            if after.stage < Stage::Ideas {
                prop_assert_eq!(after.selected_trend_id, None);
            }
            if after.stage < Stage::Proposal {
                prop_assert_eq!(after.selected_idea_id, None);
            }
        }
    }

    // Embeds appear in journey order and never ahead of the current stage
    #[test]
    fn prop_embeds_match_reached_stages(events in proptest::collection::vec(arb_event(), 0..30)) {
        let store = ConversationStore::new();
        let ctx = test_context();

        for event in events {
            if let Ok(result) = transition(&store.snapshot(), &ctx, event) {
                apply(&store, result.effects);
            }
            let state = store.snapshot();
            let stages = embed_kinds(&state);
            prop_assert!(stages.windows(2).all(|w| w[0] < w[1]), "embeds out of order: {:?}", stages);
            prop_assert!(stages.iter().all(|s| *s <= state.stage));
            prop_assert!(!state.is_typing, "typing left on after a completed turn");
        }
    }

    // Rejected triggers never produce effects, so the store is untouched
    #[test]
    fn prop_rejection_leaves_state_alone(stage in arb_stage(), event in arb_event()) {
        let store = ConversationStore::new();
        store.set_stage(stage);
        let before = store.snapshot();

        match transition(&before, &test_context(), event.clone()) {
            Ok(result) => {
                prop_assert!(!result.effects.is_empty(), "{} accepted without effects", event.name());
            }
            Err(TransitionError::InvalidTransition { stage: rejected_in, trigger }) => {
                prop_assert_eq!(rejected_in, stage);
                prop_assert_eq!(trigger, event.name());
            }
            Err(TransitionError::UnknownSelection { .. }) => {
                // Nothing was offered yet
                prop_assert!(
                    matches!(event, Event::SelectTrend { .. } | Event::SelectIdea { .. }),
                    "{} rejected as an unknown selection",
                    event.name()
                );
            }
            Err(TransitionError::Busy) => prop_assert!(false, "store was not typing"),
        }
        prop_assert_eq!(store.snapshot(), before);
    }

    // While typing, every user trigger is refused
    #[test]
    fn prop_busy_rejects_user_triggers(stage in arb_stage(), event in arb_event()) {
        let store = ConversationStore::new();
        store.set_stage(stage);
        store.set_typing(true);

        let result = transition(&store.snapshot(), &test_context(), event.clone());
        if event.is_user_trigger() {
            prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
        }
    }

    // Offered ids are always selectable in their stage
    #[test]
    fn prop_offered_ids_selectable(pick in 0usize..5) {
        let store = ConversationStore::new();
        store.append_message(
            crate::conversation::MessageRole::Assistant,
            "trends",
            Some(Embed::Trends(crate::script::trends())),
        );
        store.set_stage(Stage::Trends);

        let ids = store.snapshot().offered_trend_ids();
        let id = ids[pick % ids.len()];
        let result = transition(&store.snapshot(), &test_context(), Event::SelectTrend { id });
        prop_assert!(result.is_ok());
    }
}
