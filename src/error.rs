use crate::core::FieldId;
use thiserror::Error;

/// Configuration errors. These are raised synchronously while building a
/// form and refuse initialization.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form has no steps")]
    NoSteps,

    #[error("form id must not be empty")]
    MissingFormId,

    #[error("duplicate field id '{0}'")]
    DuplicateField(FieldId),

    #[error("unknown field '{0}'")]
    UnknownField(FieldId),

    #[error("invalid form definition: {0}")]
    Definition(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejection returned by `FormController::submit`. The display text is
/// the user-visible blocking message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{message}")]
    NotOnLastStep { message: String },

    #[error("{message}")]
    Invalid { message: String },
}

impl SubmitError {
    pub fn message(&self) -> &str {
        match self {
            Self::NotOnLastStep { message } | Self::Invalid { message } => message,
        }
    }
}
