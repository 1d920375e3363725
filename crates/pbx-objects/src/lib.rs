//! Typed object model for Xcode project files.
//!
//! Every object in a `project.pbxproj` `objects` table decodes into one
//! variant of [`Entity`]. Variants of the same family embed a shared base
//! struct ([`TargetBase`], [`BuildPhaseBase`], [`FileElementBase`]) and all
//! relationships are held as [`Identifier`](pbx_types::Identifier)s, resolved
//! through an [`ObjectLookup`] when needed.
//!
//! # Key Types
//!
//! - [`Entity`] / [`Isa`] — Closed sum type over object kinds and its tag
//! - [`PbxObject`] — Decode/encode protocol implemented by every variant
//! - [`ObjectDecoder`] — Typed field access with precise errors
//! - [`EncodeContext`] / [`ObjectEncoder`] — Canonical dictionaries with regenerated comments

pub mod build_phase;
pub mod configuration;
pub mod decode;
pub mod dependency;
pub mod encode;
pub mod entity;
pub mod error;
pub mod file_element;
pub mod project;
pub mod target;

pub use build_phase::{
    BuildFile, BuildPhaseBase, CopyFilesBuildPhase, FrameworksBuildPhase, HeadersBuildPhase,
    ResourcesBuildPhase, ShellScriptBuildPhase, SourcesBuildPhase, SubfolderSpec,
    DEFAULT_BUILD_ACTION_MASK,
};
pub use configuration::{BuildConfiguration, ConfigurationList};
pub use decode::{decode_legacy_bool, ObjectDecoder};
pub use dependency::{BuildRule, ContainerItemProxy, ProxyType, TargetDependency};
pub use encode::{EncodeContext, ObjectEncoder, ObjectLookup};
pub use entity::{Entity, EntityKind, Isa, PbxObject};
pub use error::{ObjectError, ObjectResult};
pub use file_element::{
    FileElementBase, FileReference, Group, ReferenceProxy, SourceTree, VariantGroup,
    VersionGroup,
};
pub use project::{Project, ProjectReference};
pub use target::{AggregateTarget, LegacyTarget, NativeTarget, ProductType, TargetBase};
