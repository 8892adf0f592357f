use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoachError {
    #[error("{0}")] Validation(#[from] ValidationError),
    #[error("configuration error: {0}")] Configuration(String),
    #[error("service error: {0}")] Service(String),
    #[error("the AI service returned an empty response")] EmptyResponse,
}

impl CoachError {
    /// Configuration problems disable generation until fixed; everything
    /// else is a one-shot message.
    pub fn is_persistent(&self) -> bool {
        matches!(self, CoachError::Configuration(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select at least one {label} option.")]
    MissingSelection { field: &'static str, label: &'static str },
    #[error("{label} is required.")]
    Missing { field: &'static str, label: &'static str },
    #[error("{label} must be between {min} and {max} (got {value}).")]
    OutOfRange { field: &'static str, label: &'static str, min: i64, max: i64, value: i64 },
    #[error("{label}: '{value}' is not one of the available options.")]
    UnknownOption { field: &'static str, label: &'static str, value: String },
    #[error("{label}: expected {expected}.")]
    WrongKind { field: &'static str, label: &'static str, expected: &'static str },
    #[error("{0}")]
    Invalid(String),
}

impl ValidationError {
    /// The form field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingSelection { field, .. }
            | ValidationError::Missing { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::UnknownOption { field, .. }
            | ValidationError::WrongKind { field, .. } => Some(field),
            ValidationError::Invalid(_) => None,
        }
    }
}
