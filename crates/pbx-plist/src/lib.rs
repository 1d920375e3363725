//! ASCII property-list codec for PBX project files.
//!
//! This crate converts between plist text and the generic
//! [`PlistValue`](pbx_types::PlistValue) tree. It does not know anything about
//! project objects; the object model decodes typed entities from the tree it
//! produces, and the project crate drives the [`PlistWriter`] to lay out the
//! canonical file.
//!
//! Only the dialect used by project files is supported: strings (quoted or
//! bare), arrays, dictionaries, and `/* */` annotations trailing a string.
//! There are no data, date, or number literals; numbers are bare strings.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod writer;

pub use error::{PlistError, PlistResult};
pub use parser::{parse, parse_str, MAX_DEPTH};
pub use writer::{quote, render, PlistWriter, UTF8_HEADER};
