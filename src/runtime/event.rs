use crate::state::cursor::NavigationState;
use serde::Serialize;

/// Outward notifications for the view layer, drained from the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "signal", rename_all = "camelCase")]
pub enum FormSignal {
    StepChanged(NavigationState),
    /// Carries the index of the step just left.
    StepCompleted { step: usize },
    ScrollToTop,
    ProgressSaved,
    ProgressRestored { timestamp: u64 },
    SubmissionRejected { message: String },
    FormValid,
}
