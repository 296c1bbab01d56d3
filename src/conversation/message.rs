//! Conversation log entries

use super::embed::Embed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One entry in the conversation log.
///
/// Messages are only ever created by the store; fields are read-only from
/// the outside so an appended entry can never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    role: MessageRole,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embed: Option<Embed>,
}

impl Message {
    pub(super) fn new(role: MessageRole, content: String, embed: Option<Embed>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            embed,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn embed(&self) -> Option<&Embed> {
        self.embed.as_ref()
    }
}
