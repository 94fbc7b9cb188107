//! HTTP implementation of [`RecommendationBackend`].

use async_trait::async_trait;

use crate::backend::{
    FeedbackAck, FeedbackPayload, RecommendOutcome, RecommendationBackend, STATUS_SUCCESS,
    interpret_recommend_body,
};
use crate::error::BackendError;
use crate::session::FormData;

/// Client for the recommendation service's REST endpoints.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RecommendationBackend for HttpBackend {
    async fn recommend(&self, form: &FormData) -> Result<RecommendOutcome, BackendError> {
        let response = self
            .client
            .post(self.api_url("recommend"))
            .json(form)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        interpret_recommend_body(&body)
    }

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.api_url("submit_feedback"))
            .json(payload)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let ack: FeedbackAck = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        if ack.status == STATUS_SUCCESS {
            Ok(())
        } else {
            Err(BackendError::Status {
                status: ack.status,
                message: ack
                    .message
                    .unwrap_or_else(|| "Feedback submission failed".to_string()),
            })
        }
    }
}
