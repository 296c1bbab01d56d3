//! Analysis backend error types

use thiserror::Error;

/// Analysis backend error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    /// HTTP status, when the backend answered at all
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::NotConfigured, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unavailable, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidResponse, message)
    }
}

/// Error classification for fallback logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// No backend is wired up; callers fall back to scripted content
    NotConfigured,
    /// Transport failure, timeout, or non-success status
    Unavailable,
    /// The backend answered with something we cannot use
    InvalidResponse,
}

impl BackendErrorKind {
    /// Whether the conversation can proceed with scripted content instead
    pub fn has_fallback(self) -> bool {
        matches!(self, Self::NotConfigured)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Unavailable => "unavailable",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        let error = if e.is_decode() {
            BackendError::invalid_response(format!("Undecodable backend response: {e}"))
        } else if e.is_timeout() {
            BackendError::unavailable(format!("Backend request timed out: {e}"))
        } else {
            BackendError::unavailable(format!("Backend request failed: {e}"))
        };
        match status {
            Some(code) => error.with_status(code),
            None => error,
        }
    }
}
