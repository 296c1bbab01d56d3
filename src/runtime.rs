//! Runtime for executing sessions
//!
//! Each session owns a store and a background task that runs its triggers.
//! Handles are cheap to clone and are what the HTTP layer talks to.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{DispatchOutcome, Orchestrator, SessionRuntime};

use crate::backend::AnalysisBackend;
use crate::conversation::ConversationStore;
use crate::state_machine::{transition, Event, ScriptTiming, SessionContext, TransitionError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_util::sync::CancellationToken;

const COMMAND_CAPACITY: usize = 32;

/// A trigger queued for a session's runtime
#[derive(Debug)]
pub struct SessionCommand {
    pub event: Event,
    /// Reset count when the command was queued
    pub epoch: u64,
    /// Answered once the turn has run to completion
    pub reply: Option<oneshot::Sender<Result<DispatchOutcome, TransitionError>>>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Session runtime stopped")]
    Closed,
}

/// Turn bookkeeping shared by a session's handles and its runtime
#[derive(Debug, Default)]
pub struct TurnControl {
    resets: u64,
    cancel: CancellationToken,
}

impl TurnControl {
    /// Token for a command queued at `epoch`, or `None` if a reset was
    /// requested after it was queued.
    pub fn start_turn(&mut self, epoch: u64) -> Option<CancellationToken> {
        if epoch < self.resets {
            return None;
        }
        self.cancel = CancellationToken::new();
        Some(self.cancel.clone())
    }

    /// Cancel the running turn and outdate every queued command
    fn begin_reset(&mut self) -> u64 {
        self.resets += 1;
        self.cancel.cancel();
        self.resets
    }
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    context: SessionContext,
    store: ConversationStore,
    command_tx: mpsc::Sender<SessionCommand>,
    turns: Arc<Mutex<TurnControl>>,
    last_active: Arc<Mutex<Instant>>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.context.session_id
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Queue a trigger without waiting for its turn to finish.
    ///
    /// The trigger is checked against the current state first so callers get
    /// rejections synchronously; the runtime checks again when it runs it.
    pub async fn submit(&self, event: Event) -> Result<(), SessionError> {
        transition(&self.store.snapshot(), &self.context, event.clone())?;
        let epoch = self.turns().resets;
        self.send(SessionCommand {
            event,
            epoch,
            reply: None,
        })
        .await
    }

    /// Queue a trigger and wait until it and everything it generates has run
    pub async fn dispatch(&self, event: Event) -> Result<DispatchOutcome, SessionError> {
        let epoch = self.turns().resets;
        self.dispatch_at(event, epoch).await
    }

    /// Stop the running turn, drop anything queued behind it, then clear the store
    pub async fn reset(&self) -> Result<(), SessionError> {
        let epoch = self.turns().begin_reset();
        self.dispatch_at(Event::Reset, epoch).await.map(|_| ())
    }

    async fn dispatch_at(&self, event: Event, epoch: u64) -> Result<DispatchOutcome, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand {
            event,
            epoch,
            reply: Some(reply_tx),
        })
        .await?;
        let outcome = reply_rx.await.map_err(|_| SessionError::Closed)??;
        Ok(outcome)
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.touch();
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    fn turns(&self) -> MutexGuard<'_, TurnControl> {
        self.turns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }
}

/// Manager for all session runtimes
pub struct RuntimeManager {
    backend: Arc<dyn AnalysisBackend>,
    timing: ScriptTiming,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl RuntimeManager {
    pub fn new(backend: Arc<dyn AnalysisBackend>, timing: ScriptTiming) -> Self {
        Self {
            backend,
            timing,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn AnalysisBackend> {
        &self.backend
    }

    /// Start a fresh session in the initial state
    pub async fn create(&self) -> SessionHandle {
        let session_id = uuid::Uuid::new_v4().to_string();
        let context = SessionContext::new(&session_id, self.timing);
        let store = ConversationStore::new();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let turns = Arc::new(Mutex::new(TurnControl::default()));

        let orchestrator =
            Orchestrator::new(context.clone(), store.clone(), Arc::clone(&self.backend));
        let runtime = SessionRuntime::new(orchestrator, command_rx, Arc::clone(&turns));
        tokio::spawn(runtime.run());

        let handle = SessionHandle {
            context,
            store,
            command_tx,
            turns,
            last_active: Arc::new(Mutex::new(Instant::now())),
        };
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.clone(), handle.clone());
        tracing::info!(session_id = %session_id, active = sessions.len(), "Session created");
        handle
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let handle = self.sessions.read().await.get(session_id).cloned()?;
        handle.touch();
        Some(handle)
    }

    /// Drop a session. Its runtime stops once in-flight handles are gone.
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(handle) => {
                handle.turns().cancel.cancel();
                tracing::info!(session_id = %session_id, "Session removed");
                true
            }
            None => false,
        }
    }

    /// Drop sessions nobody has touched for `ttl`. Sessions mid-turn are kept.
    pub async fn sweep_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|session_id, handle| {
            let expired = handle.idle_for() >= ttl && !handle.store.is_typing();
            if expired {
                handle.turns().cancel.cancel();
                tracing::info!(session_id = %session_id, "Session expired");
            }
            !expired
        });
        before - sessions.len()
    }
}
