//! Wizard step state machine tracking which screen is visible.

use serde::{Deserialize, Serialize};

/// The six wizard steps.
///
/// Progresses linearly: Problem → Details → Recommendations → Feedback
/// → Booking → Done. `next`/`prev` move one step at a time; there is no
/// skipping and no branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Problem,
    Details,
    Recommendations,
    Feedback,
    Booking,
    Done,
}

impl Step {
    /// 1-based position, as shown to the user ("Step 2 of 6").
    pub fn index(&self) -> u8 {
        match self {
            Self::Problem => 1,
            Self::Details => 2,
            Self::Recommendations => 3,
            Self::Feedback => 4,
            Self::Booking => 5,
            Self::Done => 6,
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (Problem, Details)
                | (Details, Problem)
                | (Details, Recommendations)
                | (Recommendations, Details)
                | (Recommendations, Feedback)
                | (Feedback, Recommendations)
                | (Feedback, Booking)
                | (Booking, Feedback)
                | (Booking, Done)
        )
    }

    /// Whether this step is terminal (the flow is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The next step in the linear progression, if any.
    pub fn next(&self) -> Option<Step> {
        use Step::*;
        match self {
            Problem => Some(Details),
            Details => Some(Recommendations),
            Recommendations => Some(Feedback),
            Feedback => Some(Booking),
            Booking => Some(Done),
            Done => None,
        }
    }

    /// The previous step, if any. The terminal step has no way back;
    /// "back to home" resets the whole flow instead.
    pub fn prev(&self) -> Option<Step> {
        use Step::*;
        match self {
            Problem => None,
            Details => Some(Problem),
            Recommendations => Some(Details),
            Feedback => Some(Recommendations),
            Booking => Some(Feedback),
            Done => None,
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::Problem
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Problem => "problem",
            Self::Details => "details",
            Self::Recommendations => "recommendations",
            Self::Feedback => "feedback",
            Self::Booking => "booking",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}
