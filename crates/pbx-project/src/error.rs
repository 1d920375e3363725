use pbx_objects::ObjectError;
use pbx_plist::PlistError;
use pbx_store::StoreError;

/// Errors from parsing or serializing a whole project file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    /// The text is not a well-formed plist.
    #[error(transparent)]
    Plist(#[from] PlistError),

    /// An object could not be decoded or encoded.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// The object table is inconsistent (duplicate identifiers, wrong kinds).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The top-level `rootObject` key is absent.
    #[error("project file has no rootObject")]
    MissingRootObject,

    /// The top-level dictionary does not have the shape of a project file.
    #[error("invalid project file: {0}")]
    InvalidHeader(String),
}

/// Result alias for project codec operations.
pub type ProjectResult<T> = Result<T, ProjectError>;
