//! Foundation types for PBX project files.
//!
//! This crate provides the value-level vocabulary shared by every other
//! `pbx-*` crate: the opaque object identifier, the commented string used to
//! annotate identifiers in output, and the type-erased plist value tree that
//! sits between the text codec and the typed object model.
//!
//! # Key Types
//!
//! - [`Identifier`] — Opaque token naming one object in a project
//! - [`CommentedString`] — A string paired with an advisory `/* comment */`
//! - [`PlistValue`] — Tagged union over strings, arrays, and dictionaries
//! - [`PlistDict`] — Insertion-ordered dictionary keyed by [`CommentedString`]

pub mod commented;
pub mod error;
pub mod identifier;
pub mod value;

pub use commented::CommentedString;
pub use error::{TypeError, TypeResult};
pub use identifier::Identifier;
pub use value::{PlistDict, PlistValue, ValueKind};
