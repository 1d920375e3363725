use thiserror::Error;

/// Errors from plist parsing and rendering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlistError {
    /// Malformed token stream. `offset` is a byte offset into the input.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The input is not valid UTF-8. `offset` is where decoding failed.
    #[error("invalid UTF-8 at byte {offset}")]
    Encoding { offset: usize },
}

impl PlistError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}

/// Result alias for plist operations.
pub type PlistResult<T> = Result<T, PlistError>;
