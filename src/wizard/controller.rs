//! WizardController: owns the step position, the cumulative form data,
//! and the snapshot/backend/reconciler orchestration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::backend::{FeedbackPayload, RecommendationBackend};
use crate::config::WizardConfig;
use crate::error::{Result, WizardError};
use crate::reconcile::{ReconcilerHandle, SessionFeed, spawn_reconciler};
use crate::segment::{MAX_TOOLS, segment};
use crate::selection::SelectionSet;
use crate::session::{FormData, SessionSnapshot};
use crate::store::SessionStore;
use crate::wizard::{RecommendationState, Step};

/// Status line shown with feedback submissions.
const FEEDBACK_STATUS: &str = "Feedback Submitted";

/// Rotating status copy shown while the recommendation call is in
/// flight. Purely cosmetic.
const LOADING_MESSAGES: [&str; 4] = [
    "Analyzing your inputs...",
    "Matching tools to your problem...",
    "Balancing usability, scalability, and affordability...",
    "Almost there — shortlisting your top matches...",
];

/// Pick the loading message for a given rotation tick.
pub fn loading_message(tick: usize) -> &'static str {
    LOADING_MESSAGES[tick % LOADING_MESSAGES.len()]
}

/// Result of a feedback submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The service acknowledged the submission.
    Submitted,
    /// Another submission was already in flight; this one was a no-op.
    InFlight,
}

/// What the recommendations step renders.
#[derive(Debug, Clone, Default)]
pub struct RecommendationView {
    /// False while the text is absent or still a placeholder.
    pub ready: bool,
    /// Segmented tool blocks, in source order.
    pub blocks: Vec<String>,
    /// Tool names: service-supplied when present, segmented otherwise.
    pub names: Vec<String>,
    /// Currently selected tool names.
    pub selected: Vec<String>,
}

/// Orchestrates the six-step intake flow.
///
/// All fields live behind locks so the controller can be shared with
/// background tasks; methods take `&self`.
pub struct WizardController {
    config: WizardConfig,
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn RecommendationBackend>,
    feed: Arc<dyn SessionFeed>,
    step: RwLock<Step>,
    form: RwLock<FormData>,
    recommendations: Arc<RwLock<RecommendationState>>,
    selection: RwLock<SelectionSet>,
    loading: AtomicBool,
    feedback_in_flight: AtomicBool,
    reconciler: Mutex<Option<ReconcilerHandle>>,
}

impl WizardController {
    pub fn new(
        config: WizardConfig,
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn RecommendationBackend>,
        feed: Arc<dyn SessionFeed>,
    ) -> Self {
        Self {
            config,
            store,
            backend,
            feed,
            step: RwLock::new(Step::default()),
            form: RwLock::new(FormData::default()),
            recommendations: Arc::new(RwLock::new(RecommendationState::default())),
            selection: RwLock::new(SelectionSet::new()),
            loading: AtomicBool::new(false),
            feedback_in_flight: AtomicBool::new(false),
            reconciler: Mutex::new(None),
        }
    }

    pub async fn step(&self) -> Step {
        *self.step.read().await
    }

    pub async fn form(&self) -> FormData {
        self.form.read().await.clone()
    }

    /// Whether the recommendation call is in flight (loading sub-state).
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    pub fn booking_url(&self) -> &str {
        &self.config.booking_url
    }

    pub async fn set_problem(&self, problem: &str) {
        self.form.write().await.problem = problem.to_string();
    }

    pub async fn set_details(
        &self,
        name: &str,
        email: &str,
        company_size: &str,
        budget: Option<f64>,
    ) {
        let mut form = self.form.write().await;
        form.name = name.to_string();
        form.email = email.to_string();
        form.company_size = company_size.to_string();
        form.budget = budget;
    }

    /// Step 1 → 2. Rejected while the trimmed problem text is empty.
    pub async fn advance_from_problem(&self) -> Result<()> {
        self.expect_step(Step::Problem).await?;
        if self.form.read().await.problem.trim().is_empty() {
            return Err(WizardError::EmptyProblem.into());
        }
        *self.step.write().await = Step::Details;
        Ok(())
    }

    /// Step 2 → 3: submit the form and adopt the generated text.
    ///
    /// Transport failures and non-success statuses leave the wizard on
    /// the details step with the form intact for retry.
    pub async fn generate_recommendations(&self) -> Result<()> {
        self.expect_step(Step::Details).await?;

        let form = self.form.read().await.clone();
        self.loading.store(true, Ordering::Relaxed);
        let result = self.backend.recommend(&form).await;
        self.loading.store(false, Ordering::Relaxed);
        let outcome = result?;

        {
            let mut state = self.recommendations.write().await;
            state.text = outcome.text;
            state.supplied_names = outcome.tool_names;
            state.ready = true;
        }

        self.persist_snapshot().await;
        *self.step.write().await = Step::Recommendations;
        self.start_reconciler().await;
        Ok(())
    }

    /// What the recommendations step should render right now.
    ///
    /// Segmentation is recomputed from the active text on every call,
    /// never patched incrementally.
    pub async fn recommendation_view(&self) -> RecommendationView {
        let state = self.recommendations.read().await;
        let selected = self.selection.read().await.names().to_vec();

        if !state.is_displayable() {
            return RecommendationView {
                ready: false,
                selected,
                ..Default::default()
            };
        }

        let seg = segment(&state.text);
        let names = if state.supplied_names.is_empty() {
            seg.names
        } else {
            state.supplied_names.iter().take(MAX_TOOLS).cloned().collect()
        };

        RecommendationView {
            ready: true,
            blocks: seg.blocks,
            names,
            selected,
        }
    }

    /// Toggle a tool in or out of the selection.
    pub async fn toggle_tool(&self, name: &str) {
        self.selection.write().await.toggle(name);
    }

    pub async fn selected_tools(&self) -> Vec<String> {
        self.selection.read().await.names().to_vec()
    }

    /// Step 3 → 4. Rejected while nothing is selected; otherwise the
    /// session snapshot is persisted and the reconciler torn down.
    pub async fn advance_from_recommendations(&self) -> Result<()> {
        self.expect_step(Step::Recommendations).await?;
        if self.selection.read().await.is_empty() {
            return Err(WizardError::NoToolsSelected.into());
        }

        self.persist_snapshot().await;
        self.stop_reconciler();
        *self.step.write().await = Step::Feedback;
        Ok(())
    }

    /// Step 4 → 5: submit feedback built from the persisted snapshot.
    ///
    /// A rating of 0 is rejected before any network call. While one
    /// submission is outstanding a second attempt is a no-op; the guard
    /// is released when the call settles, success or failure.
    pub async fn submit_feedback(&self, rating: u8, comment: &str) -> Result<FeedbackOutcome> {
        self.expect_step(Step::Feedback).await?;
        if rating == 0 {
            return Err(WizardError::RatingMissing.into());
        }

        if self.feedback_in_flight.swap(true, Ordering::SeqCst) {
            return Ok(FeedbackOutcome::InFlight);
        }

        let snapshot = self.snapshot_for_feedback().await;
        let payload = FeedbackPayload {
            user: snapshot.profile,
            problem: snapshot.problem,
            recommendations: snapshot.recommendations,
            selected_tools: snapshot.selected_tools,
            rating,
            user_feedback: comment.to_string(),
            status: FEEDBACK_STATUS.to_string(),
            created_at: Utc::now(),
        };

        let result = self.backend.submit_feedback(&payload).await;
        self.feedback_in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                if let Err(e) = self.store.clear_session().await {
                    warn!("Failed to clear session snapshot: {e}");
                }
                *self.step.write().await = Step::Booking;
                info!("Feedback submitted");
                Ok(FeedbackOutcome::Submitted)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Step 5 → 6. The booking step always advances.
    pub async fn finish_booking(&self) -> Result<()> {
        self.expect_step(Step::Booking).await?;
        *self.step.write().await = Step::Done;
        Ok(())
    }

    /// Go back one step, tearing down the reconciler when leaving the
    /// recommendations step and restarting it when re-entering.
    pub async fn back(&self) -> Result<()> {
        let current = self.step().await;
        let Some(previous) = current.prev() else {
            return Err(WizardError::WrongStep {
                step: current.index(),
            }
            .into());
        };

        if current == Step::Recommendations {
            self.stop_reconciler();
        }
        *self.step.write().await = previous;
        if previous == Step::Recommendations {
            self.start_reconciler().await;
        }
        Ok(())
    }

    /// Reset the whole flow to the first step with fresh state.
    pub async fn reset(&self) {
        self.stop_reconciler();
        *self.step.write().await = Step::Problem;
        *self.form.write().await = FormData::default();
        *self.recommendations.write().await = RecommendationState::default();
        *self.selection.write().await = SelectionSet::new();
        self.loading.store(false, Ordering::Relaxed);
        self.feedback_in_flight.store(false, Ordering::Relaxed);
    }

    async fn expect_step(&self, expected: Step) -> Result<()> {
        let current = self.step().await;
        if current == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                step: current.index(),
            }
            .into())
        }
    }

    /// Write the current session snapshot to durable storage.
    ///
    /// A storage failure blocks nothing; it is logged and the flow
    /// continues with in-memory state.
    async fn persist_snapshot(&self) {
        let snapshot = SessionSnapshot {
            profile: self.form.read().await.profile(),
            problem: self.form.read().await.problem.clone(),
            recommendations: self.recommendations.read().await.text.clone(),
            selected_tools: self.selection.read().await.names().to_vec(),
        };
        if let Err(e) = self.store.save_session(&snapshot).await {
            warn!("Failed to persist session snapshot: {e}");
        }
    }

    /// The snapshot feeding the feedback payload: durable storage first,
    /// in-memory state as the fallback.
    async fn snapshot_for_feedback(&self) -> SessionSnapshot {
        match self.store.load_session().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => self.in_memory_snapshot().await,
            Err(e) => {
                warn!("Failed to load session snapshot: {e}");
                self.in_memory_snapshot().await
            }
        }
    }

    async fn in_memory_snapshot(&self) -> SessionSnapshot {
        let form = self.form.read().await;
        SessionSnapshot {
            profile: form.profile(),
            problem: form.problem.clone(),
            recommendations: self.recommendations.read().await.text.clone(),
            selected_tools: self.selection.read().await.names().to_vec(),
        }
    }

    /// Start polling for updated recommendation text.
    ///
    /// Inert unless a user email is known from durable storage.
    async fn start_reconciler(&self) {
        self.stop_reconciler();

        let email = match self.store.load_session().await {
            Ok(Some(snapshot)) if !snapshot.profile.email.trim().is_empty() => {
                snapshot.profile.email
            }
            Ok(_) => return,
            Err(e) => {
                warn!("Cannot start reconciler: {e}");
                return;
            }
        };

        let handle = spawn_reconciler(
            Arc::clone(&self.feed),
            email,
            self.config.poll_interval,
            Arc::clone(&self.recommendations),
        );

        if let Ok(mut slot) = self.reconciler.lock() {
            *slot = Some(handle);
        }
    }

    /// Tear down the poll task immediately. Safe to call when none runs.
    fn stop_reconciler(&self) {
        if let Ok(mut slot) = self.reconciler.lock() {
            if let Some(handle) = slot.take() {
                handle.stop();
            }
        }
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        self.stop_reconciler();
    }
}
