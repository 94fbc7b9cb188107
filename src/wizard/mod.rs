//! Wizard orchestration: step machine, controller, shared view state.

pub mod controller;
pub mod step;

pub use controller::{FeedbackOutcome, RecommendationView, WizardController, loading_message};
pub use step::Step;

/// Active recommendation content, shared between the controller and the
/// background reconciler.
#[derive(Debug, Clone, Default)]
pub struct RecommendationState {
    /// Opaque text from the service (possibly a placeholder).
    pub text: String,
    /// Tool names the service pre-extracted; these take precedence over
    /// local segmentation while they belong to the current text.
    pub supplied_names: Vec<String>,
    /// Set once the service has reported a definitive success.
    pub ready: bool,
}

impl RecommendationState {
    /// Placeholder text must never be treated as final content.
    pub fn is_placeholder(&self) -> bool {
        self.text.contains("Generating") || self.text.contains("Processing")
    }

    /// Whether there is final content to segment and display.
    pub fn is_displayable(&self) -> bool {
        self.ready && !self.text.trim().is_empty() && !self.is_placeholder()
    }
}
