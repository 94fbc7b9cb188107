//! Integration tests for the wizard controller.
//!
//! Each test wires the controller to stub collaborators (backend,
//! session feed, in-memory libsql store) and exercises the real step
//! transitions end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use toolscout::backend::{FeedbackPayload, RecommendOutcome, RecommendationBackend};
use toolscout::config::WizardConfig;
use toolscout::error::{BackendError, Error, WizardError};
use toolscout::reconcile::SessionFeed;
use toolscout::store::{LibSqlStore, SessionStore};
use toolscout::wizard::{FeedbackOutcome, Step, WizardController};

#[derive(Clone)]
enum RecommendBehavior {
    Success { text: String, names: Vec<String> },
    StatusError,
    Transport,
}

#[derive(Clone)]
enum FeedbackBehavior {
    Success,
    StatusError,
}

/// Stub recommendation service (no real network calls).
struct StubBackend {
    recommend_behavior: RecommendBehavior,
    feedback_behavior: FeedbackBehavior,
    feedback_delay: Duration,
    recommend_calls: AtomicUsize,
    feedback_calls: AtomicUsize,
}

impl StubBackend {
    fn new(recommend: RecommendBehavior, feedback: FeedbackBehavior) -> Arc<Self> {
        Arc::new(Self {
            recommend_behavior: recommend,
            feedback_behavior: feedback,
            feedback_delay: Duration::ZERO,
            recommend_calls: AtomicUsize::new(0),
            feedback_calls: AtomicUsize::new(0),
        })
    }

    fn with_feedback_delay(recommend: RecommendBehavior, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            recommend_behavior: recommend,
            feedback_behavior: FeedbackBehavior::Success,
            feedback_delay: delay,
            recommend_calls: AtomicUsize::new(0),
            feedback_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RecommendationBackend for StubBackend {
    async fn recommend(&self, _form: &toolscout::session::FormData) -> Result<RecommendOutcome, BackendError> {
        self.recommend_calls.fetch_add(1, Ordering::SeqCst);
        match &self.recommend_behavior {
            RecommendBehavior::Success { text, names } => Ok(RecommendOutcome {
                text: text.clone(),
                tool_names: names.clone(),
            }),
            RecommendBehavior::StatusError => Err(BackendError::Status {
                status: "error".to_string(),
                message: "generation failed".to_string(),
            }),
            RecommendBehavior::Transport => {
                Err(BackendError::Http("connection refused".to_string()))
            }
        }
    }

    async fn submit_feedback(&self, _payload: &FeedbackPayload) -> Result<(), BackendError> {
        self.feedback_calls.fetch_add(1, Ordering::SeqCst);
        if !self.feedback_delay.is_zero() {
            tokio::time::sleep(self.feedback_delay).await;
        }
        match self.feedback_behavior {
            FeedbackBehavior::Success => Ok(()),
            FeedbackBehavior::StatusError => Err(BackendError::Status {
                status: "error".to_string(),
                message: "storage unavailable".to_string(),
            }),
        }
    }
}

/// Stub session feed returning a fixed document.
struct StubFeed {
    text: Option<String>,
}

#[async_trait]
impl SessionFeed for StubFeed {
    async fn fetch_recommendations(&self, _email: &str) -> Result<Option<String>, BackendError> {
        Ok(self.text.clone())
    }
}

fn test_config() -> WizardConfig {
    WizardConfig {
        poll_interval: Duration::from_millis(20),
        ..Default::default()
    }
}

async fn controller_with(
    backend: Arc<StubBackend>,
    feed_text: Option<String>,
) -> (WizardController, Arc<dyn SessionStore>) {
    let store: Arc<dyn SessionStore> = Arc::new(LibSqlStore::new_memory().await.unwrap());
    let feed = Arc::new(StubFeed { text: feed_text });
    let controller = WizardController::new(test_config(), Arc::clone(&store), backend, feed);
    (controller, store)
}

/// Walk a controller to the recommendations step with a filled form.
async fn reach_recommendations(controller: &WizardController) {
    controller.set_problem("Too much manual work").await;
    controller.advance_from_problem().await.unwrap();
    controller
        .set_details("Alice", "alice@example.com", "SMB", Some(100.0))
        .await;
    controller.generate_recommendations().await.unwrap();
    assert_eq!(controller.step().await, Step::Recommendations);
}

fn two_tools() -> RecommendBehavior {
    RecommendBehavior::Success {
        text: "1. **Acme CRM** - great\n2. **Zeta Docs** - good".to_string(),
        names: Vec::new(),
    }
}

#[tokio::test]
async fn empty_problem_blocks_first_transition() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, _store) = controller_with(backend, None).await;

    controller.set_problem("   ").await;
    let err = controller.advance_from_problem().await.unwrap_err();
    assert!(matches!(err, Error::Wizard(WizardError::EmptyProblem)));
    assert_eq!(controller.step().await, Step::Problem);

    controller.set_problem("Need a CRM").await;
    controller.advance_from_problem().await.unwrap();
    assert_eq!(controller.step().await, Step::Details);
}

#[tokio::test]
async fn segmented_names_drive_the_view() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, _store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;

    let view = controller.recommendation_view().await;
    assert!(view.ready);
    assert_eq!(view.names, ["Acme CRM", "Zeta Docs"]);
    assert_eq!(view.blocks.len(), 2);
}

#[tokio::test]
async fn supplied_tool_names_take_precedence() {
    // Scenario: the service pre-extracts names; local extraction (which
    // would have produced "Acme CRM"/"Zeta Docs") must not run the show.
    let backend = StubBackend::new(
        RecommendBehavior::Success {
            text: "1. **Acme CRM** - great\n2. **Zeta Docs** - good".to_string(),
            names: vec!["X".to_string()],
        },
        FeedbackBehavior::Success,
    );
    let (controller, _store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;

    let view = controller.recommendation_view().await;
    assert_eq!(view.names, ["X"]);
}

#[tokio::test]
async fn recommend_failure_stays_on_details_with_form_intact() {
    let backend = StubBackend::new(RecommendBehavior::StatusError, FeedbackBehavior::Success);
    let (controller, _store) = controller_with(backend, None).await;

    controller.set_problem("Need a CRM").await;
    controller.advance_from_problem().await.unwrap();
    controller.set_details("Bob", "bob@example.com", "Mid", None).await;

    let err = controller.generate_recommendations().await.unwrap_err();
    assert!(matches!(err, Error::Backend(BackendError::Status { .. })));
    assert_eq!(controller.step().await, Step::Details);
    assert_eq!(controller.form().await.email, "bob@example.com");
}

#[tokio::test]
async fn transport_failure_is_retryable() {
    let backend = StubBackend::new(RecommendBehavior::Transport, FeedbackBehavior::Success);
    let (controller, _store) = controller_with(Arc::clone(&backend), None).await;

    controller.set_problem("Need a CRM").await;
    controller.advance_from_problem().await.unwrap();
    controller.set_details("Bob", "bob@example.com", "Mid", None).await;

    assert!(controller.generate_recommendations().await.is_err());
    assert!(controller.generate_recommendations().await.is_err());
    assert_eq!(backend.recommend_calls.load(Ordering::SeqCst), 2);
    assert_eq!(controller.step().await, Step::Details);
}

#[tokio::test]
async fn zero_selection_blocks_advancement() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, _store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;

    let err = controller.advance_from_recommendations().await.unwrap_err();
    assert!(matches!(err, Error::Wizard(WizardError::NoToolsSelected)));
    assert_eq!(controller.step().await, Step::Recommendations);
}

#[tokio::test]
async fn advancing_with_selection_persists_the_snapshot() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;

    controller.toggle_tool("Acme CRM").await;
    controller.advance_from_recommendations().await.unwrap();
    assert_eq!(controller.step().await, Step::Feedback);

    let snapshot = store.load_session().await.unwrap().unwrap();
    assert_eq!(snapshot.profile.name, "Alice");
    assert_eq!(snapshot.profile.email, "alice@example.com");
    assert_eq!(snapshot.problem, "Too much manual work");
    assert!(snapshot.recommendations.contains("Acme CRM"));
    assert_eq!(snapshot.selected_tools, ["Acme CRM"]);
}

#[tokio::test]
async fn zero_rating_blocks_submission_without_network_call() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, _store) = controller_with(Arc::clone(&backend), None).await;
    reach_recommendations(&controller).await;
    controller.toggle_tool("Acme CRM").await;
    controller.advance_from_recommendations().await.unwrap();

    let err = controller.submit_feedback(0, "meh").await.unwrap_err();
    assert!(matches!(err, Error::Wizard(WizardError::RatingMissing)));
    assert_eq!(backend.feedback_calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.step().await, Step::Feedback);
}

#[tokio::test]
async fn duplicate_submission_is_a_no_op() {
    let backend =
        StubBackend::with_feedback_delay(two_tools(), Duration::from_millis(50));
    let (controller, _store) = controller_with(Arc::clone(&backend), None).await;
    reach_recommendations(&controller).await;
    controller.toggle_tool("Acme CRM").await;
    controller.advance_from_recommendations().await.unwrap();

    let (first, second) = tokio::join!(
        controller.submit_feedback(5, "great"),
        controller.submit_feedback(5, "great"),
    );

    let outcomes = [first.unwrap(), second.unwrap()];
    assert!(outcomes.contains(&FeedbackOutcome::Submitted));
    assert!(outcomes.contains(&FeedbackOutcome::InFlight));
    assert_eq!(backend.feedback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.step().await, Step::Booking);
}

#[tokio::test]
async fn successful_feedback_clears_the_snapshot_and_advances() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;
    controller.toggle_tool("Zeta Docs").await;
    controller.advance_from_recommendations().await.unwrap();

    let outcome = controller.submit_feedback(4, "useful").await.unwrap();
    assert_eq!(outcome, FeedbackOutcome::Submitted);
    assert_eq!(controller.step().await, Step::Booking);
    assert!(store.load_session().await.unwrap().is_none());
}

#[tokio::test]
async fn failed_feedback_stays_on_step_and_releases_the_guard() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::StatusError);
    let (controller, store) = controller_with(Arc::clone(&backend), None).await;
    reach_recommendations(&controller).await;
    controller.toggle_tool("Acme CRM").await;
    controller.advance_from_recommendations().await.unwrap();

    assert!(controller.submit_feedback(3, "hmm").await.is_err());
    assert_eq!(controller.step().await, Step::Feedback);
    assert!(store.load_session().await.unwrap().is_some());

    // Guard released on failure: a retry reaches the backend again.
    assert!(controller.submit_feedback(3, "hmm").await.is_err());
    assert_eq!(backend.feedback_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reconciler_adopts_new_text_without_touching_selection() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let updated = "1. **Acme CRM** - great\n2. **Zeta Docs** - good\n3. **New Kid** - fresh";
    let (controller, _store) = controller_with(backend, Some(updated.to_string())).await;
    reach_recommendations(&controller).await;
    controller.toggle_tool("Acme CRM").await;

    // Give the poll loop time to run at least one cycle past the
    // initial skipped tick.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let view = controller.recommendation_view().await;
    assert_eq!(view.blocks.len(), 3);
    assert_eq!(view.names, ["Acme CRM", "Zeta Docs", "New Kid"]);
    assert_eq!(view.selected, ["Acme CRM"]);
}

#[tokio::test]
async fn booking_always_advances_and_done_is_terminal() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, _store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;
    controller.toggle_tool("Acme CRM").await;
    controller.advance_from_recommendations().await.unwrap();
    controller.submit_feedback(5, "").await.unwrap();

    assert_eq!(controller.step().await, Step::Booking);
    assert!(!controller.booking_url().is_empty());
    controller.finish_booking().await.unwrap();
    assert_eq!(controller.step().await, Step::Done);

    // No way back from the terminal step; reset starts over.
    assert!(controller.back().await.is_err());
    controller.reset().await;
    assert_eq!(controller.step().await, Step::Problem);
    assert!(controller.form().await.problem.is_empty());
    assert!(controller.selected_tools().await.is_empty());
}

#[tokio::test]
async fn back_retraces_one_step_at_a_time() {
    let backend = StubBackend::new(two_tools(), FeedbackBehavior::Success);
    let (controller, _store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;

    controller.back().await.unwrap();
    assert_eq!(controller.step().await, Step::Details);
    controller.back().await.unwrap();
    assert_eq!(controller.step().await, Step::Problem);
    assert!(controller.back().await.is_err());
}

#[tokio::test]
async fn placeholder_text_is_not_ready() {
    let backend = StubBackend::new(
        RecommendBehavior::Success {
            text: "⚙️ Still Generating your results...".to_string(),
            names: Vec::new(),
        },
        FeedbackBehavior::Success,
    );
    let (controller, _store) = controller_with(backend, None).await;
    reach_recommendations(&controller).await;

    let view = controller.recommendation_view().await;
    assert!(!view.ready);
    assert!(view.blocks.is_empty());
    assert!(view.names.is_empty());
}
