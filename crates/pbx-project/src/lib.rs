//! Read and write complete `project.pbxproj` files.
//!
//! [`parse`] turns file bytes into a [`ProjectGraph`]: top-level metadata plus
//! an [`ObjectStore`](pbx_store::ObjectStore) holding every decoded object.
//! [`serialize`] writes a graph back in Xcode's canonical layout. A file that
//! is already canonical survives `parse` then `serialize` byte for byte.
//!
//! ```no_run
//! let bytes = std::fs::read("App.xcodeproj/project.pbxproj")?;
//! let graph = pbx_project::parse(&bytes)?;
//! for target in graph.targets()? {
//!     println!("{}", target.display_name().unwrap_or_default());
//! }
//! let out = pbx_project::serialize(&graph)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod error;
pub mod graph;
pub mod options;

pub use codec::{parse, parse_with, serialize, serialize_to_string, serialize_with};
pub use error::{ProjectError, ProjectResult};
pub use graph::{ProjectGraph, DEFAULT_ARCHIVE_VERSION, DEFAULT_OBJECT_VERSION};
pub use options::{CodecOptions, UnknownKindPolicy};
