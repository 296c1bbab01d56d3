//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real analysis service.

use crate::backend::{AnalysisBackend, AnalysisReply, AnalysisRequest, BackendError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock Analysis Backend
// ============================================================================

/// Returns queued replies in order; with nothing queued it reports
/// `NotConfigured`, which sends the runtime down the scripted path.
#[derive(Default)]
pub struct MockAnalysisBackend {
    replies: Mutex<VecDeque<Result<AnalysisReply, BackendError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl MockAnalysisBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_reply(&self, reply: AnalysisReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_error(&self, error: BackendError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for MockAnalysisBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::not_configured("No mock reply queued")))
    }

    async fn probe(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Pending Backend
// ============================================================================

/// Never answers; lets tests hold a turn open at the analysis step
pub struct PendingBackend;

#[async_trait]
impl AnalysisBackend for PendingBackend {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisReply, BackendError> {
        std::future::pending().await
    }

    async fn probe(&self) -> Result<(), BackendError> {
        Err(BackendError::unavailable("Backend is not answering"))
    }

    fn name(&self) -> &str {
        "pending"
    }
}
