pub mod cursor;
pub mod validation;

pub use cursor::{NavigationState, StepCursor, StepStatus};
pub use validation::ValidationState;
