//! Validation errors for domain records

use thiserror::Error;

/// A record or draft failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank
    #[error("{0} is required")]
    Required(&'static str),

    /// A field is present but malformed
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field name as it appears on the wire
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
