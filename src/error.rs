//! Error types for toolscout.

/// Top-level error type for the wizard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Persistence-related errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors talking to the recommendation service or the session feed.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Service returned status {status}: {message}")]
    Status { status: String, message: String },

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),
}

/// Validation and transition errors raised by the wizard itself.
///
/// These block a single transition and leave all state intact for retry.
/// None of them is ever fatal.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Please describe your problem before continuing")]
    EmptyProblem,

    #[error("Please select at least one tool before continuing")]
    NoToolsSelected,

    #[error("Please provide a rating before submitting")]
    RatingMissing,

    #[error("Action not available on step {step}")]
    WrongStep { step: u8 },
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
