use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::identifier::Identifier;

/// A string value with an optional advisory comment.
///
/// The comment is rendered as `/* comment */` after the value and is purely
/// informational: it never participates in equality, ordering, or hashing.
/// Comments are derived from the object store at write time, so a stale
/// comment can never leak into output.
#[derive(Clone)]
pub struct CommentedString {
    value: String,
    comment: Option<String>,
}

impl CommentedString {
    /// A string without a comment.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            comment: None,
        }
    }

    /// A string annotated with `comment`.
    pub fn with_comment(value: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            comment: Some(comment.into()),
        }
    }

    /// A string with an optional comment.
    pub fn with_optional_comment(value: impl Into<String>, comment: Option<String>) -> Self {
        Self {
            value: value.into(),
            comment,
        }
    }

    /// The raw value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The advisory comment, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Split into `(value, comment)`.
    pub fn into_parts(self) -> (String, Option<String>) {
        (self.value, self.comment)
    }
}

impl PartialEq for CommentedString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for CommentedString {}

impl Hash for CommentedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for CommentedString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CommentedString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl Borrow<str> for CommentedString {
    fn borrow(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for CommentedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comment {
            Some(comment) => write!(f, "{:?} /* {} */", self.value, comment),
            None => write!(f, "{:?}", self.value),
        }
    }
}

impl fmt::Display for CommentedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for CommentedString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CommentedString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Identifier> for CommentedString {
    fn from(id: &Identifier) -> Self {
        Self::new(id.as_str())
    }
}
