//! Recommendation update reconciliation.
//!
//! While the recommendations step is on screen, a background task polls
//! a read-only session feed for a later, more complete version of the
//! recommendation text keyed by the user's email. Fetched text is
//! adopted only when it is non-empty and differs by value from what is
//! currently displayed; adoption overwrites the active text (never
//! merges) and never touches the user's tool selections.
//!
//! Poll failures are logged and swallowed; one bad tick never stops the
//! interval. The task is torn down deterministically the moment the
//! wizard leaves the recommendations step.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::BackendError;
use crate::wizard::RecommendationState;

/// Read-only point lookup of a session's recommendation text by email.
#[async_trait]
pub trait SessionFeed: Send + Sync {
    /// Fetch the stored recommendation text for `email`, if any.
    async fn fetch_recommendations(&self, email: &str) -> Result<Option<String>, BackendError>;
}

/// HTTP session feed: `GET {base}/{email}` returning a JSON document
/// with a `recommendations` string field.
pub struct HttpSessionFeed {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSessionFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SessionFeed for HttpSessionFeed {
    async fn fetch_recommendations(&self, email: &str) -> Result<Option<String>, BackendError> {
        let url = format!("{}/{email}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(document
            .get("recommendations")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }
}

/// Decides whether a fetched text replaces the currently displayed one.
pub struct Reconciler {
    feed: Arc<dyn SessionFeed>,
    email: String,
}

impl Reconciler {
    pub fn new(feed: Arc<dyn SessionFeed>, email: impl Into<String>) -> Self {
        Self {
            feed,
            email: email.into(),
        }
    }

    /// Run one poll cycle against the feed.
    ///
    /// Returns the text to adopt, or `None` when there is nothing new.
    /// Errors are logged and swallowed so the caller's interval keeps
    /// running.
    pub async fn poll_once(&self, current: &str) -> Option<String> {
        match self.feed.fetch_recommendations(&self.email).await {
            Ok(Some(text)) => {
                if !text.trim().is_empty() && text != current {
                    Some(text)
                } else {
                    None
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Session feed poll failed: {e}");
                None
            }
        }
    }
}

/// Overwrite the active text with an adopted update.
///
/// Names supplied with the original response belong to that response;
/// after adoption the segmenter drives name extraction again.
pub(crate) fn apply_update(state: &mut RecommendationState, text: String) {
    state.text = text;
    state.supplied_names.clear();
}

/// Handle to a running reconciliation task.
///
/// [`ReconcilerHandle::stop`] must be called the moment the wizard
/// leaves the recommendations step; a timer that keeps firing against a
/// stale email after navigation is a correctness bug. Dropping the
/// handle also aborts the task.
pub struct ReconcilerHandle {
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Stop polling immediately.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.handle.abort();
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.handle.abort();
    }
}

/// Spawn the background poll loop.
///
/// Each tick fetches the session document for `email` and, when the
/// replacement rule says so, overwrites the shared recommendation
/// state. Selections are owned elsewhere and are never modified here.
pub fn spawn_reconciler(
    feed: Arc<dyn SessionFeed>,
    email: String,
    poll_interval: Duration,
    state: Arc<RwLock<RecommendationState>>,
) -> ReconcilerHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!(
            "Reconciler started, polling every {}s for {email}",
            poll_interval.as_secs()
        );
        let reconciler = Reconciler::new(feed, email);
        let mut tick = tokio::time::interval(poll_interval);
        // The first tick of tokio's interval fires immediately; skip it
        // so the initial response stays on screen for one full period.
        tick.tick().await;

        loop {
            tick.tick().await;

            if shutdown_flag.load(Ordering::Relaxed) {
                info!("Reconciler shutting down");
                return;
            }

            let current = state.read().await.text.clone();
            match reconciler.poll_once(&current).await {
                Some(text) => {
                    info!("Adopting updated recommendation text from feed");
                    apply_update(&mut *state.write().await, text);
                }
                None => debug!("No recommendation update"),
            }
        }
    });

    ReconcilerHandle { shutdown, handle }
}
