//! Conversation data model and its store

pub mod embed;
mod message;
mod store;

pub use embed::{Embed, EmbedKind};
pub use message::{Message, MessageRole};
pub use store::{ConversationStore, StoreEvent};
