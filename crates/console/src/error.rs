//! Console-level error types.

use std::time::Duration;

use thiserror::Error;

/// Why the variable form refuses to submit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("variable name is required")]
    EmptyName,

    /// Names may only use letters, digits, `.`, `_` and `-`.
    #[error("invalid variable name '{0}'")]
    InvalidName(String),

    #[error("variable type is required")]
    MissingType,

    #[error("unknown variable type '{0}'")]
    UnknownType(String),

    #[error("variable value is required")]
    EmptyValue,
}

/// Errors returned while fetching variable types.
#[derive(Debug, Error, Clone)]
pub enum SourceError {
    /// The API call failed.
    #[error("variable types unavailable: {0}")]
    Unavailable(String),

    /// The API did not answer in time.
    #[error("variable types request timed out after {0:?}")]
    Timeout(Duration),
}
