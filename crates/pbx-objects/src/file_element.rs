//! File references, groups, and other entries of the project navigator.

use std::fmt;
use std::str::FromStr;

use pbx_types::{Identifier, PlistDict};

use crate::decode::ObjectDecoder;
use crate::encode::{EncodeContext, ObjectEncoder};
use crate::entity::{Isa, PbxObject};
use crate::error::ObjectResult;

/// What a file element's `path` is relative to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceTree {
    Group,
    Absolute,
    SourceRoot,
    BuiltProductsDir,
    SdkRoot,
    DeveloperDir,
    Other(String),
}

impl SourceTree {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Group => "<group>",
            Self::Absolute => "<absolute>",
            Self::SourceRoot => "SOURCE_ROOT",
            Self::BuiltProductsDir => "BUILT_PRODUCTS_DIR",
            Self::SdkRoot => "SDKROOT",
            Self::DeveloperDir => "DEVELOPER_DIR",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for SourceTree {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<group>" => Self::Group,
            "<absolute>" => Self::Absolute,
            "SOURCE_ROOT" => Self::SourceRoot,
            "BUILT_PRODUCTS_DIR" => Self::BuiltProductsDir,
            "SDKROOT" => Self::SdkRoot,
            "DEVELOPER_DIR" => Self::DeveloperDir,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for SourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by file references and groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileElementBase {
    pub reference: Identifier,
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: Option<SourceTree>,
}

impl FileElementBase {
    pub fn new(reference: Identifier) -> Self {
        Self {
            reference,
            name: None,
            path: None,
            source_tree: None,
        }
    }

    fn decode(d: &ObjectDecoder<'_>) -> ObjectResult<Self> {
        // `parsed` cannot fail for infallible FromStr impls.
        Ok(Self {
            reference: d.reference().clone(),
            name: d.string("name")?,
            path: d.string("path")?,
            source_tree: d.parsed("sourceTree")?,
        })
    }

    fn encode(&self, e: &mut ObjectEncoder<'_>) {
        e.opt_string("name", self.name.as_deref());
        e.opt_string("path", self.path.as_deref());
        if let Some(tree) = &self.source_tree {
            e.string("sourceTree", tree.as_str());
        }
    }

    /// Name if set, else path.
    pub fn display_name(&self) -> Option<String> {
        self.name.clone().or_else(|| self.path.clone())
    }
}

// ---------------------------------------------------------------------------
// PBXFileReference
// ---------------------------------------------------------------------------

/// A file on disk (or a build product).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReference {
    pub base: FileElementBase,
    pub file_encoding: Option<u32>,
    pub explicit_file_type: Option<String>,
    pub last_known_file_type: Option<String>,
    pub include_in_index: Option<bool>,
}

impl FileReference {
    pub fn new(reference: Identifier, path: impl Into<String>, source_tree: SourceTree) -> Self {
        let mut base = FileElementBase::new(reference);
        base.path = Some(path.into());
        base.source_tree = Some(source_tree);
        Self {
            base,
            file_encoding: None,
            explicit_file_type: None,
            last_known_file_type: None,
            include_in_index: None,
        }
    }
}

impl PbxObject for FileReference {
    const ISA: Isa = Isa::FileReference;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: FileElementBase::decode(&d)?,
            file_encoding: d.parsed("fileEncoding")?,
            explicit_file_type: d.string("explicitFileType")?,
            last_known_file_type: d.string("lastKnownFileType")?,
            include_in_index: d.optional_legacy_bool("includeInIndex"),
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e);
        if let Some(encoding) = self.file_encoding {
            e.string("fileEncoding", encoding.to_string());
        }
        e.opt_string("explicitFileType", self.explicit_file_type.as_deref());
        e.opt_string("lastKnownFileType", self.last_known_file_type.as_deref());
        if let Some(include) = self.include_in_index {
            e.legacy_bool("includeInIndex", include);
        }
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        Vec::new()
    }

    fn display_name(&self) -> Option<String> {
        self.base.display_name()
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

macro_rules! group_kind {
    ($(#[$doc:meta])* $name:ident, $isa:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub base: FileElementBase,
            /// Child file elements, in navigator order.
            pub children: Vec<Identifier>,
        }

        impl $name {
            pub fn new(reference: Identifier) -> Self {
                Self {
                    base: FileElementBase::new(reference),
                    children: Vec::new(),
                }
            }
        }

        impl PbxObject for $name {
            const ISA: Isa = Isa::$isa;

            fn reference(&self) -> &Identifier {
                &self.base.reference
            }

            fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
                let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
                Ok(Self {
                    base: FileElementBase::decode(&d)?,
                    children: d.references("children")?,
                })
            }

            fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
                let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
                self.base.encode(&mut e);
                e.references("children", &self.children)?;
                Ok(e.finish())
            }

            fn references(&self) -> Vec<&Identifier> {
                self.children.iter().collect()
            }

            fn display_name(&self) -> Option<String> {
                self.base.display_name()
            }
        }
    };
}

group_kind!(
    /// A folder in the project navigator.
    Group,
    Group
);
group_kind!(
    /// Localized variants of one resource.
    VariantGroup,
    VariantGroup
);

/// A versioned bundle such as a Core Data model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionGroup {
    pub base: FileElementBase,
    pub children: Vec<Identifier>,
    pub current_version: Option<Identifier>,
    pub version_group_type: Option<String>,
}

impl PbxObject for VersionGroup {
    const ISA: Isa = Isa::VersionGroup;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: FileElementBase::decode(&d)?,
            children: d.references("children")?,
            current_version: d.reference_field("currentVersion")?,
            version_group_type: d.string("versionGroupType")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e);
        e.references("children", &self.children)?;
        e.opt_reference("currentVersion", self.current_version.as_ref())?;
        e.opt_string("versionGroupType", self.version_group_type.as_deref());
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.children.iter().chain(&self.current_version).collect()
    }

    fn display_name(&self) -> Option<String> {
        self.base.display_name()
    }
}

// ---------------------------------------------------------------------------
// PBXReferenceProxy
// ---------------------------------------------------------------------------

/// A product of another project, seen through a container item proxy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceProxy {
    pub base: FileElementBase,
    pub file_type: Option<String>,
    pub remote_ref: Option<Identifier>,
}

impl PbxObject for ReferenceProxy {
    const ISA: Isa = Isa::ReferenceProxy;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: FileElementBase::decode(&d)?,
            file_type: d.string("fileType")?,
            remote_ref: d.reference_field("remoteRef")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e);
        e.opt_string("fileType", self.file_type.as_deref());
        e.opt_reference("remoteRef", self.remote_ref.as_ref())?;
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.remote_ref.iter().collect()
    }

    fn display_name(&self) -> Option<String> {
        self.base.display_name()
    }
}
