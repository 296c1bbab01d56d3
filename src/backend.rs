//! External analysis backend
//!
//! The input stage forwards the user's text to an analysis service. When no
//! service is configured the orchestrator falls back to scripted content.

mod error;
mod http;

pub use error::{BackendError, BackendErrorKind};
pub use http::HttpAnalysisBackend;

use crate::conversation::Embed;
use crate::script;
use crate::state_machine::Stage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Body sent to the analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub message: String,
    pub stage: Stage,
}

/// Body returned by the analysis service, as sent on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub stage: String,
    #[serde(default)]
    pub embed_type: Option<String>,
    #[serde(default)]
    pub embed_data: Option<Value>,
}

/// A decoded analysis reply
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReply {
    pub message: String,
    pub stage: Stage,
    pub embed: Option<Embed>,
}

impl AnalysisReply {
    /// The reply used when no backend is configured
    pub fn scripted() -> Self {
        Self {
            message: script::TRENDS_SUMMARY.to_string(),
            stage: Stage::Trends,
            embed: Some(Embed::Trends(script::trends())),
        }
    }

    /// Decode the wire format. An unknown stage is an error; an embed that
    /// does not decode is dropped.
    pub fn from_wire(reply: ChatReply) -> Result<Self, BackendError> {
        let stage: Stage = reply
            .stage
            .parse()
            .map_err(|e| BackendError::invalid_response(format!("{e}")))?;

        let embed = match (reply.embed_type, reply.embed_data) {
            (Some(kind), Some(data)) => match Embed::from_parts(&kind, data) {
                Ok(embed) => Some(embed),
                Err(e) => {
                    tracing::warn!(embed_type = %kind, error = %e, "Dropping undecodable embed");
                    None
                }
            },
            _ => None,
        };

        Ok(Self {
            message: reply.message,
            stage,
            embed,
        })
    }

    /// Check the reply against the stage the conversation is in.
    ///
    /// The reply may keep the stage or advance it by one. An embed whose tag
    /// does not belong to the landing stage is dropped.
    pub fn validate_for(mut self, current: Stage) -> Result<Self, BackendError> {
        if self.stage != current && current.next() != Some(self.stage) {
            return Err(BackendError::invalid_response(format!(
                "Backend moved stage from {current} to {}",
                self.stage
            )));
        }

        let lands_in_new_stage = self.stage != current;
        if let Some(embed) = &self.embed {
            if !lands_in_new_stage || embed.kind().stage() != self.stage {
                tracing::warn!(
                    embed_type = %embed.kind(),
                    stage = %self.stage,
                    "Dropping embed that does not match its stage"
                );
                self.embed = None;
            }
        }

        Ok(self)
    }
}

/// Capability boundary to the analysis service
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Forward the user's text and current stage
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, BackendError>;

    /// Cheap reachability check
    async fn probe(&self) -> Result<(), BackendError>;

    fn name(&self) -> &str;
}

#[async_trait]
impl<T: AnalysisBackend + ?Sized> AnalysisBackend for Arc<T> {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, BackendError> {
        (**self).analyze(request).await
    }

    async fn probe(&self) -> Result<(), BackendError> {
        (**self).probe().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Backend used when no service URL is set
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredBackend;

#[async_trait]
impl AnalysisBackend for UnconfiguredBackend {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisReply, BackendError> {
        Err(BackendError::not_configured("No analysis backend configured"))
    }

    async fn probe(&self) -> Result<(), BackendError> {
        Err(BackendError::not_configured("No analysis backend configured"))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

/// Logging wrapper for analysis backends
pub struct LoggingBackend {
    inner: Arc<dyn AnalysisBackend>,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn AnalysisBackend>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AnalysisBackend for LoggingBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.analyze(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    backend = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    stage = %reply.stage,
                    embed = ?reply.embed.as_ref().map(Embed::kind),
                    "Analysis request completed"
                );
            }
            Err(e) if e.kind.has_fallback() => {
                tracing::debug!(backend = %self.inner.name(), "Analysis backend not configured");
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    "Analysis request failed"
                );
            }
        }

        result
    }

    async fn probe(&self) -> Result<(), BackendError> {
        self.inner.probe().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
