//! API request and response types

use crate::integrations::IntegrationStatus;
use crate::state_machine::ConversationState;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to pick a trend or idea by id
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub id: u32,
}

/// One session's full state
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    #[serde(flatten)]
    pub state: ConversationState,
}

/// Response for session creation
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session: SessionResponse,
}

/// Response for queued triggers
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct IntegrationsResponse {
    pub integrations: Vec<IntegrationStatus>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
