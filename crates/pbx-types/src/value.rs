//! The type-erased plist value tree.
//!
//! [`PlistValue`] is produced fresh by the parser and re-created by the
//! serializer on every write. It never outlives a single parse or serialize
//! pass; the typed object model is the authoritative in-memory form.

use std::collections::HashMap;
use std::fmt;

use crate::commented::CommentedString;
use crate::error::{TypeError, TypeResult};

/// Shape of a [`PlistValue`], used in type-mismatch errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Array,
    Dictionary,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Array => write!(f, "array"),
            Self::Dictionary => write!(f, "dictionary"),
        }
    }
}

/// Any node of an ASCII plist.
///
/// `Commented` is the identifier leaf: a string that carries a `/* */`
/// annotation in text form. For equality and shape checks it behaves exactly
/// like `String`.
#[derive(Clone, Debug)]
pub enum PlistValue {
    String(String),
    Commented(CommentedString),
    Array(Vec<PlistValue>),
    Dictionary(PlistDict),
}

impl PlistValue {
    /// Shorthand for a plain string value.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Shorthand for a commented string value.
    pub fn commented(value: impl Into<String>, comment: Option<String>) -> Self {
        Self::Commented(CommentedString::with_optional_comment(value, comment))
    }

    /// Legacy boolean encoding: `"1"` for true, `"0"` for false.
    pub fn legacy_bool(value: bool) -> Self {
        Self::String(if value { "1" } else { "0" }.to_string())
    }

    /// The shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) | Self::Commented(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    /// The string contents, if this is a (commented) string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Commented(s) => Some(s.value()),
            _ => None,
        }
    }

    /// The comment attached to a commented string.
    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Commented(s) => s.comment(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PlistDict> {
        match self {
            Self::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut PlistDict> {
        match self {
            Self::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Like [`as_str`](Self::as_str) but fails with [`TypeError::Mismatch`].
    pub fn expect_str(&self) -> TypeResult<&str> {
        self.as_str().ok_or_else(|| self.mismatch(ValueKind::String))
    }

    /// Like [`as_array`](Self::as_array) but fails with [`TypeError::Mismatch`].
    pub fn expect_array(&self) -> TypeResult<&[PlistValue]> {
        self.as_array().ok_or_else(|| self.mismatch(ValueKind::Array))
    }

    /// Like [`as_dict`](Self::as_dict) but fails with [`TypeError::Mismatch`].
    pub fn expect_dict(&self) -> TypeResult<&PlistDict> {
        self.as_dict().ok_or_else(|| self.mismatch(ValueKind::Dictionary))
    }

    /// Take the dictionary out of this value.
    pub fn into_dict(self) -> TypeResult<PlistDict> {
        match self {
            Self::Dictionary(dict) => Ok(dict),
            other => Err(other.mismatch(ValueKind::Dictionary)),
        }
    }

    /// Drop every comment in the tree, turning commented strings into plain ones.
    pub fn strip_comments(self) -> Self {
        match self {
            Self::Commented(s) => Self::String(s.into_parts().0),
            Self::Array(items) => Self::Array(items.into_iter().map(Self::strip_comments).collect()),
            Self::Dictionary(dict) => Self::Dictionary(
                dict.into_iter()
                    .map(|(k, v)| (CommentedString::new(k.into_parts().0), v.strip_comments()))
                    .collect(),
            ),
            other => other,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> TypeError {
        TypeError::Mismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl PartialEq for PlistValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Dictionary(a), Self::Dictionary(b)) => a == b,
            _ => match (self.as_str(), other.as_str()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for PlistValue {}

impl From<&str> for PlistValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<CommentedString> for PlistValue {
    fn from(value: CommentedString) -> Self {
        Self::Commented(value)
    }
}

impl From<Vec<PlistValue>> for PlistValue {
    fn from(items: Vec<PlistValue>) -> Self {
        Self::Array(items)
    }
}

impl From<PlistDict> for PlistValue {
    fn from(dict: PlistDict) -> Self {
        Self::Dictionary(dict)
    }
}

// ---------------------------------------------------------------------------
// PlistDict
// ---------------------------------------------------------------------------

/// Insertion-ordered dictionary keyed by [`CommentedString`].
///
/// Keys are unique by value. Inserting an existing key replaces its value in
/// place, keeping the original position. Equality ignores entry order.
#[derive(Clone, Debug, Default)]
pub struct PlistDict {
    entries: Vec<(CommentedString, PlistValue)>,
    index: HashMap<String, usize>,
}

impl PlistDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(
        &mut self,
        key: impl Into<CommentedString>,
        value: impl Into<PlistValue>,
    ) -> Option<PlistValue> {
        let key = key.into();
        let value = value.into();
        if let Some(&pos) = self.index.get(key.value()) {
            let slot = &mut self.entries[pos];
            slot.0 = key;
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.index.insert(key.value().to_string(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PlistValue> {
        let pos = *self.index.get(key)?;
        Some(&mut self.entries[pos].1)
    }

    /// The stored key (with its comment) for `key`.
    pub fn get_key(&self, key: &str) -> Option<&CommentedString> {
        self.index.get(key).map(|&pos| &self.entries[pos].0)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<PlistValue> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        self.reindex();
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CommentedString, &PlistValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CommentedString> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Reorder entries with a comparator over keys.
    pub fn sort_keys_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> std::cmp::Ordering,
    {
        self.entries.sort_by(|(a, _), (b, _)| compare(a.value(), b.value()));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, (key, _)) in self.entries.iter().enumerate() {
            self.index.insert(key.value().to_string(), pos);
        }
    }
}

impl PartialEq for PlistDict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key.value()) == Some(value))
    }
}

impl Eq for PlistDict {}

impl FromIterator<(CommentedString, PlistValue)> for PlistDict {
    fn from_iter<I: IntoIterator<Item = (CommentedString, PlistValue)>>(iter: I) -> Self {
        let mut dict = PlistDict::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl IntoIterator for PlistDict {
    type Item = (CommentedString, PlistValue);
    type IntoIter = std::vec::IntoIter<(CommentedString, PlistValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
