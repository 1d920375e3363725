//! Error types for the object model.

use pbx_types::{Identifier, ValueKind};

/// Errors raised while decoding or encoding project objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// A required key is absent from an object's dictionary.
    #[error("object {reference} ({isa}) is missing required field `{field}`")]
    MissingField {
        /// The object being decoded.
        reference: Identifier,
        /// Its `isa` tag.
        isa: String,
        /// The absent key.
        field: String,
    },

    /// A field holds a value of the wrong shape.
    #[error("object {reference}: field `{field}` should be {expected}, found {found}")]
    TypeMismatch {
        reference: Identifier,
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A field holds a string that cannot be interpreted (e.g. a non-numeric mask).
    #[error("object {reference}: field `{field}` has invalid value {value:?}")]
    InvalidValue {
        reference: Identifier,
        field: String,
        value: String,
    },

    /// An `isa` tag that no object variant recognizes.
    #[error("object {reference} has unknown isa `{isa}`")]
    UnknownEntityKind { reference: Identifier, isa: String },

    /// An object references an identifier that is not in the store.
    #[error("object {owner} references missing object {reference}")]
    DanglingReference {
        /// The object holding the reference.
        owner: Identifier,
        /// The identifier that failed to resolve.
        reference: Identifier,
    },
}

/// Convenience alias for object model results.
pub type ObjectResult<T> = Result<T, ObjectError>;
