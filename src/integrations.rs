//! External collaborator status
//!
//! Trend scraping, long-term memory and browser automation are capability
//! boundaries with no implementation behind them. The analysis backend is the
//! only collaborator that can actually be reached.

use crate::backend::{AnalysisBackend, BackendErrorKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Scraper,
    Memory,
    Browser,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityStatus {
    Available,
    NotConfigured,
    Unavailable,
}

impl From<BackendErrorKind> for CapabilityStatus {
    fn from(kind: BackendErrorKind) -> Self {
        match kind {
            BackendErrorKind::NotConfigured => Self::NotConfigured,
            // A backend that answers with junk is as good as down
            BackendErrorKind::Unavailable | BackendErrorKind::InvalidResponse => Self::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationStatus {
    pub capability: Capability,
    pub status: CapabilityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntegrationStatus {
    fn not_configured(capability: Capability) -> Self {
        Self {
            capability,
            status: CapabilityStatus::NotConfigured,
            detail: None,
        }
    }
}

/// Status of every collaborator, probing the analysis backend
pub async fn check_all(backend: &dyn AnalysisBackend) -> Vec<IntegrationStatus> {
    let analysis = match backend.probe().await {
        Ok(()) => IntegrationStatus {
            capability: Capability::Analysis,
            status: CapabilityStatus::Available,
            detail: None,
        },
        Err(e) => {
            tracing::debug!(backend = %backend.name(), error = %e, "Analysis backend probe failed");
            IntegrationStatus {
                capability: Capability::Analysis,
                status: e.kind.into(),
                detail: Some(e.message),
            }
        }
    };

    vec![
        IntegrationStatus::not_configured(Capability::Scraper),
        IntegrationStatus::not_configured(Capability::Memory),
        IntegrationStatus::not_configured(Capability::Browser),
        analysis,
    ]
}
