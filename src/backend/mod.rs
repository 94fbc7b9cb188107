//! Recommendation service client: trait seam plus HTTP implementation.

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::session::{FormData, Profile};

pub use http::HttpBackend;

/// Status sentinel the service uses to mark a successful operation.
pub const STATUS_SUCCESS: &str = "success";

/// A successfully generated recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendOutcome {
    /// Opaque free-text recommendation content.
    pub text: String,
    /// Pre-extracted tool names, when the service supplies them.
    /// These take precedence over local name extraction.
    pub tool_names: Vec<String>,
}

/// Wire shape of the `/recommend` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendResponse {
    pub status: String,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub tool_names: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outbound feedback submission body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub user: Profile,
    pub problem: String,
    pub recommendations: String,
    pub selected_tools: Vec<String>,
    /// 1–5; 0 (unset) is rejected before any call is attempted.
    pub rating: u8,
    pub user_feedback: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Wire shape of the `/submit_feedback` response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackAck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// The remote recommendation service.
#[async_trait]
pub trait RecommendationBackend: Send + Sync {
    /// Submit the accumulated form data and return the generated
    /// recommendation. A response body that is not valid JSON is
    /// treated as the recommendation text itself; a parsed body whose
    /// status is not the success sentinel is an error.
    async fn recommend(&self, form: &FormData) -> Result<RecommendOutcome, BackendError>;

    /// Submit feedback. Succeeds only when the service acknowledges
    /// with the success sentinel.
    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<(), BackendError>;
}

/// Interpret a raw `/recommend` response body.
///
/// Parse errors degrade to raw-body-as-text success and never block the
/// transition; a non-success status sentinel aborts it.
pub(crate) fn interpret_recommend_body(body: &str) -> Result<RecommendOutcome, BackendError> {
    match serde_json::from_str::<RecommendResponse>(body) {
        Ok(parsed) => {
            if parsed.status == STATUS_SUCCESS {
                Ok(RecommendOutcome {
                    text: parsed.recommendations.unwrap_or_default(),
                    tool_names: parsed.tool_names.unwrap_or_default(),
                })
            } else {
                Err(BackendError::Status {
                    status: parsed.status,
                    message: parsed
                        .message
                        .unwrap_or_else(|| "Failed to generate recommendations".to_string()),
                })
            }
        }
        Err(_) => Ok(RecommendOutcome {
            text: body.to_string(),
            tool_names: Vec::new(),
        }),
    }
}
