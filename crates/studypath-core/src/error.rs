//! Study engine error types.
//!
//! Every public engine operation fails with one of these variants. Input and
//! lookup failures are raised before any computation runs; store failures
//! carry the underlying `anyhow` chain so callers can log the full cause.

use thiserror::Error;

use crate::model::ContentKind;

/// Errors returned by [`crate::engine::StudyEngine`] operations.
#[derive(Debug, Error)]
pub enum StudyError {
    /// The request was missing data or malformed.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A referenced catalog item does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: ContentKind, id: u64 },

    /// The record store failed to read or write.
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl StudyError {
    pub fn not_found(kind: ContentKind, id: u64) -> Self {
        StudyError::NotFound { kind, id }
    }

    /// Returns `true` if the caller sent a bad request (validation or lookup).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StudyError::Validation(_) | StudyError::NotFound { .. }
        )
    }
}

/// Shorthand for results returned by engine operations.
pub type StudyResult<T> = Result<T, StudyError>;
