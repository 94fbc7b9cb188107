//! Form data and the durable session snapshot.

use serde::{Deserialize, Serialize};

/// Free-form profile fields accumulated across the first two steps.
///
/// Serialized verbatim as the body of the recommendation request. All
/// fields default to empty; only the trimmed problem text is validated
/// before leaving step 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl FormData {
    /// The profile subset carried in the snapshot and feedback payload.
    pub fn profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            email: self.email.clone(),
            company_size: self.company_size.clone(),
            budget: self.budget,
        }
    }
}

/// User profile subset sent with feedback and stored in the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

/// The durable payload bridging the recommendation and feedback steps.
///
/// One struct with named fields, persisted atomically as a single row.
/// Written when recommendations arrive (selections still empty) and
/// again when the user leaves the tool-selection step; cleared in full
/// after a successful feedback submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub profile: Profile,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub selected_tools: Vec<String>,
}
