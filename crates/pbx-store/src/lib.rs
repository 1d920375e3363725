//! Object storage for PBX project graphs.
//!
//! [`ObjectStore`] is the single owner of every [`Entity`](pbx_objects::Entity)
//! in a project. Objects refer to each other only by
//! [`Identifier`](pbx_types::Identifier); the store resolves those on demand
//! and reports references that no longer resolve.
//!
//! # Design Rules
//!
//! 1. One object per identifier. Inserting a taken identifier is an error.
//! 2. Removing an object never touches objects that refer to it; the
//!    dangling references surface at validation or serialization time.
//! 3. Iteration order is deterministic: by `isa` tag, then identifier.
//! 4. No internal locking. The store is `Send`; callers synchronize.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::ObjectStore;
