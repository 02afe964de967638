pub mod messages;
pub mod registry;
pub mod rules;
pub mod spec;
pub mod step;

pub use messages::Messages;
pub use registry::{RegexPolicy, Rule, RuleRegistry};
pub use spec::{FieldRuleSet, FieldRules, RuleSpec};
pub use step::StepValidator;

/// Outcome of one rule evaluated against one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    pub fn check(valid: bool, message: impl Into<String>) -> Self {
        if valid { Self::ok() } else { Self::fail(message) }
    }
}
