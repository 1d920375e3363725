use serde::{Deserialize, Serialize};

/// What to do with an object whose `isa` is not modelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKindPolicy {
    /// Fail the whole parse with `UnknownEntityKind`.
    #[default]
    Abort,
    /// Drop the object and log a warning. References to it are left dangling.
    Skip,
}

/// Knobs for [`parse_with`](crate::parse_with) and
/// [`serialize_with`](crate::serialize_with).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    pub unknown_kinds: UnknownKindPolicy,
    /// Fail serialization on references that do not resolve.
    pub validate_references: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            unknown_kinds: UnknownKindPolicy::Abort,
            validate_references: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let o = CodecOptions::default();
        assert_eq!(o.unknown_kinds, UnknownKindPolicy::Abort);
        assert!(o.validate_references);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let o: CodecOptions = toml::from_str("unknown_kinds = \"skip\"").unwrap();
        assert_eq!(o.unknown_kinds, UnknownKindPolicy::Skip);
        assert!(o.validate_references);

        let o: CodecOptions = toml::from_str("validate_references = false").unwrap();
        assert_eq!(o.unknown_kinds, UnknownKindPolicy::Abort);
        assert!(!o.validate_references);
    }
}
