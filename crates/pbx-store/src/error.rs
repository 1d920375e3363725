use pbx_objects::{Isa, ObjectError};
use pbx_types::Identifier;

/// Errors from object store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No object is stored under the identifier.
    #[error("object not found: {0}")]
    NotFound(Identifier),

    /// An object with the same identifier is already stored.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(Identifier),

    /// A built entity does not carry the identifier it was given.
    #[error("entity built for {expected} carries identifier {found}")]
    ReferenceMismatch {
        expected: Identifier,
        found: Identifier,
    },

    /// The object exists but is not of the requested kind.
    #[error("object {reference} is {found}, expected {expected}")]
    WrongKind {
        reference: Identifier,
        expected: Isa,
        found: Isa,
    },

    /// Decoding or encoding an object failed.
    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
