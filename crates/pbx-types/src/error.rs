use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("type mismatch: expected {expected}, found {found}")]
    Mismatch { expected: ValueKind, found: ValueKind },

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
