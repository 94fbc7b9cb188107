//! Configuration types.

use std::time::Duration;

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Base URL of the recommendation service.
    pub backend_url: String,
    /// Base URL of the read-only session feed (point lookup by email).
    pub feed_url: String,
    /// Booking page opened from the booking step.
    pub booking_url: String,
    /// How often the reconciler polls the session feed.
    pub poll_interval: Duration,
    /// How often the loading status message rotates (cosmetic).
    pub loading_rotation: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            backend_url: "https://toolscout-backend.onrender.com".to_string(),
            feed_url: "https://toolscout-backend.onrender.com/sessions".to_string(),
            booking_url: "https://calendar.app.google/RrukbCNLTkUuDyYG8".to_string(),
            poll_interval: Duration::from_secs(10),
            loading_rotation: Duration::from_secs(3),
        }
    }
}
