//! HTTP client for the external analysis service

use super::{AnalysisBackend, AnalysisReply, AnalysisRequest, BackendError, ChatReply};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Talks to `POST {base}/api/chat`
pub struct HttpAnalysisBackend {
    client: Client,
    base_url: String,
    chat_url: String,
}

impl HttpAnalysisBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: format!("{base_url}/api/chat"),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, BackendError> {
        let response = self.client.post(&self.chat_url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                BackendError::unavailable(format!("Analysis backend error: {status} {body}"))
                    .with_status(status.as_u16()),
            );
        }

        let reply: ChatReply = response.json().await?;
        AnalysisReply::from_wire(reply)
    }

    async fn probe(&self) -> Result<(), BackendError> {
        let response = self.client.get(&self.base_url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::unavailable(format!("Health check returned {status}"))
                .with_status(status.as_u16()))
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
