use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Number of random bytes in a freshly generated identifier (24 hex digits).
pub const IDENTIFIER_BYTES: usize = 12;

/// Opaque token naming one object within a project.
///
/// Xcode writes 24 uppercase hex digits, but other generators emit longer or
/// non-hex tokens, so any non-empty string read from a file is accepted as-is.
/// Identifiers created by this crate always use the 24-digit form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap an existing token. Fails only on the empty string.
    pub fn new(value: impl Into<String>) -> TypeResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(TypeError::InvalidIdentifier(value));
        }
        Ok(Self(value))
    }

    /// Generate a random identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; IDENTIFIER_BYTES];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(hex::encode_upper(bytes))
    }

    /// Derive a deterministic identifier from arbitrary material.
    ///
    /// The same material always yields the same identifier, which lets
    /// tooling regenerate stable references for the same logical object.
    pub fn derive(material: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"pbx-identifier-v1:");
        hasher.update(material);
        let hash = hasher.finalize();
        Self(hex::encode_upper(&hash.as_bytes()[..IDENTIFIER_BYTES]))
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this token has the canonical 24-digit hex shape.
    pub fn is_canonical(&self) -> bool {
        self.0.len() == IDENTIFIER_BYTES * 2
            && self.0.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Identifier {
    type Error = TypeError;

    fn try_from(value: &str) -> TypeResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Identifier {
    type Error = TypeError;

    fn try_from(value: String) -> TypeResult<Self> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn derived_identifiers_are_always_canonical(material in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert!(Identifier::derive(&material).is_canonical());
        }
    }

    #[test]
    fn generated_identifiers_are_canonical() {
        let id = Identifier::generate();
        assert_eq!(id.as_str().len(), 24);
        assert!(id.is_canonical());
    }

    #[test]
    fn generated_identifiers_differ() {
        assert_ne!(Identifier::generate(), Identifier::generate());
    }

    #[test]
    fn derive_is_deterministic() {
        let a = Identifier::derive(b"App/main.swift");
        let b = Identifier::derive(b"App/main.swift");
        assert_eq!(a, b);
        assert!(a.is_canonical());
        assert_ne!(a, Identifier::derive(b"App/other.swift"));
    }

    #[test]
    fn empty_is_rejected() {
        let err = Identifier::new("").unwrap_err();
        assert_eq!(err, TypeError::InvalidIdentifier(String::new()));
    }

    #[test]
    fn foreign_tokens_are_accepted() {
        let id = Identifier::new("OBJ_12").unwrap();
        assert_eq!(id.to_string(), "OBJ_12");
        assert!(!id.is_canonical());
    }

    #[test]
    fn ordering_follows_token() {
        let a = Identifier::new("0A").unwrap();
        let b = Identifier::new("0B").unwrap();
        assert!(a < b);
    }

    #[test]
    fn serde_is_transparent() {
        let id = Identifier::new("13B07F961A680F5B00A75B9A").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"13B07F961A680F5B00A75B9A\"");
        let parsed: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
