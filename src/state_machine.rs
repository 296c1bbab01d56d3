//! Journey state machine
//!
//! Elm-style: a pure `transition` decides effects, the runtime executes them.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ConversationState, ScriptTiming, SessionContext, Stage};
pub use transition::{transition, TransitionError};
