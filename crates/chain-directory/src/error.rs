//! Error types for directory and workflow operations
//!
//! Every failure surfaced to callers maps to one stable kind. Nothing is
//! retried internally; `Unavailable` is the only kind a caller should retry.

use chain_org::{TransitionError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Directory error types.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No identity context accompanied the request
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller resolved DENY for the target
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed id, unsupported value or missing required field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Target id is well-formed but does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation is not allowed in the target's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A concurrent operation won the race for the same target
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store could not be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl DirectoryError {
    /// Get error code for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            DirectoryError::Unauthenticated => "UNAUTHENTICATED",
            DirectoryError::Forbidden(_) => "FORBIDDEN",
            DirectoryError::InvalidInput(_) => "INVALID_INPUT",
            DirectoryError::NotFound(_) => "NOT_FOUND",
            DirectoryError::InvalidState(_) => "INVALID_STATE",
            DirectoryError::Conflict(_) => "CONFLICT",
            DirectoryError::Unavailable(_) => "UNAVAILABLE",
            DirectoryError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DirectoryError::Unauthenticated => 401,
            DirectoryError::Forbidden(_) => 403,
            DirectoryError::InvalidInput(_) => 400,
            DirectoryError::NotFound(_) => 404,
            DirectoryError::InvalidState(_) | DirectoryError::Conflict(_) => 409,
            DirectoryError::Unavailable(_) => 503,
            DirectoryError::Internal(_) => 500,
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DirectoryError::Unavailable(_))
    }

    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Serializable body for this error.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => DirectoryError::Unavailable(msg),
            StoreError::NotFound(what) => DirectoryError::NotFound(what),
            StoreError::InvariantViolation(msg) => DirectoryError::InvalidInput(msg),
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryError::Internal(format!("serialization failed: {}", err))
    }
}

impl From<ValidationError> for DirectoryError {
    fn from(err: ValidationError) -> Self {
        DirectoryError::InvalidInput(err.to_string())
    }
}

impl From<TransitionError> for DirectoryError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotPending(_) => DirectoryError::InvalidState(err.to_string()),
            TransitionError::MissingReason => DirectoryError::InvalidInput(err.to_string()),
        }
    }
}

/// Error response body: a machine-checkable kind and a readable message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_org::BranchRequestStatus;

    #[test]
    fn test_kinds_and_status_codes() {
        let cases = [
            (DirectoryError::Unauthenticated, "UNAUTHENTICATED", 401),
            (DirectoryError::Forbidden("x".into()), "FORBIDDEN", 403),
            (DirectoryError::InvalidInput("x".into()), "INVALID_INPUT", 400),
            (DirectoryError::NotFound("x".into()), "NOT_FOUND", 404),
            (DirectoryError::InvalidState("x".into()), "INVALID_STATE", 409),
            (DirectoryError::Conflict("x".into()), "CONFLICT", 409),
            (DirectoryError::Unavailable("x".into()), "UNAVAILABLE", 503),
            (DirectoryError::Internal("x".into()), "INTERNAL_ERROR", 500),
        ];
        for (err, kind, status) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(DirectoryError::Unavailable("down".into()).is_retryable());
        assert!(DirectoryError::Unavailable("down".into()).is_server_error());
        assert!(!DirectoryError::Conflict("lost".into()).is_retryable());
        assert!(!DirectoryError::Forbidden("no".into()).is_server_error());
    }

    #[test]
    fn test_transition_errors_map_to_kinds() {
        let err: DirectoryError = TransitionError::NotPending(BranchRequestStatus::Approved).into();
        assert_eq!(err.kind(), "INVALID_STATE");

        let err: DirectoryError = TransitionError::MissingReason.into();
        assert_eq!(err.kind(), "INVALID_INPUT");
    }

    #[test]
    fn test_error_body() {
        let body = DirectoryError::NotFound("organization".into()).to_body();
        assert_eq!(body.kind, "NOT_FOUND");
        assert_eq!(body.message, "Not found: organization");
    }
}
