//! In-memory conversation store
//!
//! The store is the only owner of a session's [`ConversationState`]. Every
//! mutation goes through one of the methods below and is broadcast to
//! subscribers after the state has been updated.

use super::embed::Embed;
use super::message::{Message, MessageRole};
use crate::state_machine::{ConversationState, Stage};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Notification sent to observers after a store mutation
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Message {
        message: Message,
    },
    StageChanged {
        stage: Stage,
    },
    Typing {
        is_typing: bool,
    },
    TrendSelected {
        id: u32,
        message: Message,
    },
    IdeaSelected {
        id: u32,
        message: Message,
    },
    Reset,
    /// A turn ended in an error; the state itself is unchanged
    Error {
        message: String,
    },
}

/// Thread-safe handle to one session's conversation state
#[derive(Clone)]
pub struct ConversationStore {
    state: Arc<RwLock<ConversationState>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Create a store in the initial state: `input` stage, empty log
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(ConversationState::default())),
            events,
        }
    }

    /// Subscribe to mutations made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ConversationState {
        self.read().clone()
    }

    pub fn stage(&self) -> Stage {
        self.read().stage
    }

    pub fn is_typing(&self) -> bool {
        self.read().is_typing
    }

    // ==================== Mutations ====================

    /// Append a message with a fresh id and the current timestamp
    pub fn append_message(
        &self,
        role: MessageRole,
        content: impl Into<String>,
        embed: Option<Embed>,
    ) -> Message {
        let message = Message::new(role, content.into(), embed);
        tracing::debug!(
            message_id = %message.id(),
            role = ?message.role(),
            len = message.content().len(),
            "Appending message"
        );
        let mut state = self.write();
        state.messages.push(message.clone());
        self.notify(StoreEvent::Message {
            message: message.clone(),
        });
        message
    }

    /// Overwrite the stage. Ordering is the caller's responsibility.
    pub fn set_stage(&self, stage: Stage) {
        let mut state = self.write();
        if state.stage.next() != Some(stage) && state.stage != stage {
            tracing::debug!(from = %state.stage, to = %stage, "Non-sequential stage write");
        }
        state.stage = stage;
        self.notify(StoreEvent::StageChanged { stage });
    }

    /// Record the chosen trend and announce it in the log as one step
    pub fn select_trend(&self, id: u32) -> Message {
        let message = Message::new(MessageRole::User, format!("I choose trend #{id}"), None);
        let mut state = self.write();
        state.selected_trend_id = Some(id);
        state.messages.push(message.clone());
        self.notify(StoreEvent::TrendSelected {
            id,
            message: message.clone(),
        });
        message
    }

    /// Record the chosen idea and announce it in the log as one step
    pub fn select_idea(&self, id: u32) -> Message {
        let message = Message::new(
            MessageRole::User,
            "I want to build this idea".to_string(),
            None,
        );
        let mut state = self.write();
        state.selected_idea_id = Some(id);
        state.messages.push(message.clone());
        self.notify(StoreEvent::IdeaSelected {
            id,
            message: message.clone(),
        });
        message
    }

    pub fn set_typing(&self, is_typing: bool) {
        let mut state = self.write();
        state.is_typing = is_typing;
        self.notify(StoreEvent::Typing { is_typing });
    }

    /// Clear everything back to the initial state
    pub fn reset(&self) {
        let mut state = self.write();
        *state = ConversationState::default();
        self.notify(StoreEvent::Reset);
    }

    /// Tell observers a turn failed without touching the state
    pub fn report_error(&self, message: impl Into<String>) {
        let _state = self.write();
        self.notify(StoreEvent::Error {
            message: message.into(),
        });
    }

    // ==================== Internals ====================

    // Sent while the write guard is held so observers see events in log order.
    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn read(&self) -> RwLockReadGuard<'_, ConversationState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConversationState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
