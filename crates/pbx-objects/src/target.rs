//! Build targets: native, aggregate, and legacy (external build system).
//!
//! All three share [`TargetBase`], which is embedded by composition and
//! decoded/encoded once for every target variant before the variant adds its
//! own fields.

use std::fmt;
use std::str::FromStr;

use pbx_types::{Identifier, PlistDict};
use serde::{Deserialize, Serialize};

use crate::decode::ObjectDecoder;
use crate::encode::{EncodeContext, ObjectEncoder};
use crate::entity::{Isa, PbxObject};
use crate::error::ObjectResult;

/// What a target produces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    Application,
    Framework,
    StaticLibrary,
    DynamicLibrary,
    Bundle,
    UnitTestBundle,
    UiTestBundle,
    AppExtension,
    CommandLineTool,
    WatchApp,
    WatchExtension,
    /// An identifier this crate does not model, kept verbatim.
    Other(String),
}

impl ProductType {
    /// The `com.apple.product-type.*` identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Application => "com.apple.product-type.application",
            Self::Framework => "com.apple.product-type.framework",
            Self::StaticLibrary => "com.apple.product-type.library.static",
            Self::DynamicLibrary => "com.apple.product-type.library.dynamic",
            Self::Bundle => "com.apple.product-type.bundle",
            Self::UnitTestBundle => "com.apple.product-type.bundle.unit-test",
            Self::UiTestBundle => "com.apple.product-type.bundle.ui-testing",
            Self::AppExtension => "com.apple.product-type.app-extension",
            Self::CommandLineTool => "com.apple.product-type.tool",
            Self::WatchApp => "com.apple.product-type.application.watchapp2",
            Self::WatchExtension => "com.apple.product-type.watchkit2-extension",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for ProductType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "com.apple.product-type.application" => Self::Application,
            "com.apple.product-type.framework" => Self::Framework,
            "com.apple.product-type.library.static" => Self::StaticLibrary,
            "com.apple.product-type.library.dynamic" => Self::DynamicLibrary,
            "com.apple.product-type.bundle" => Self::Bundle,
            "com.apple.product-type.bundle.unit-test" => Self::UnitTestBundle,
            "com.apple.product-type.bundle.ui-testing" => Self::UiTestBundle,
            "com.apple.product-type.app-extension" => Self::AppExtension,
            "com.apple.product-type.tool" => Self::CommandLineTool,
            "com.apple.product-type.application.watchapp2" => Self::WatchApp,
            "com.apple.product-type.watchkit2-extension" => Self::WatchExtension,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every target kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetBase {
    pub reference: Identifier,
    pub name: String,
    pub build_configuration_list: Option<Identifier>,
    pub build_phases: Vec<Identifier>,
    pub build_rules: Vec<Identifier>,
    pub dependencies: Vec<Identifier>,
    pub product_name: Option<String>,
    pub product_reference: Option<Identifier>,
    pub product_type: Option<ProductType>,
}

impl TargetBase {
    pub fn new(reference: Identifier, name: impl Into<String>) -> Self {
        Self {
            reference,
            name: name.into(),
            build_configuration_list: None,
            build_phases: Vec::new(),
            build_rules: Vec::new(),
            dependencies: Vec::new(),
            product_name: None,
            product_reference: None,
            product_type: None,
        }
    }

    fn decode(d: &ObjectDecoder<'_>) -> ObjectResult<Self> {
        Ok(Self {
            reference: d.reference().clone(),
            name: d.required_string("name")?,
            build_configuration_list: d.reference_field("buildConfigurationList")?,
            build_phases: d.references("buildPhases")?,
            build_rules: d.references("buildRules")?,
            dependencies: d.references("dependencies")?,
            product_name: d.string("productName")?,
            product_reference: d.reference_field("productReference")?,
            product_type: d.parsed("productType")?,
        })
    }

    /// `buildRules` is only written for native targets or when non-empty.
    fn encode(&self, e: &mut ObjectEncoder<'_>, always_rules: bool) -> ObjectResult<()> {
        e.opt_reference("buildConfigurationList", self.build_configuration_list.as_ref())?;
        e.references("buildPhases", &self.build_phases)?;
        if always_rules || !self.build_rules.is_empty() {
            e.references("buildRules", &self.build_rules)?;
        }
        e.references("dependencies", &self.dependencies)?;
        e.string("name", self.name.as_str());
        e.opt_string("productName", self.product_name.as_deref());
        e.opt_reference("productReference", self.product_reference.as_ref())?;
        if let Some(product_type) = &self.product_type {
            e.string("productType", product_type.as_str());
        }
        Ok(())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.build_configuration_list
            .iter()
            .chain(&self.build_phases)
            .chain(&self.build_rules)
            .chain(&self.dependencies)
            .chain(&self.product_reference)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PBXNativeTarget
// ---------------------------------------------------------------------------

/// A target built by Xcode's own build system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeTarget {
    pub base: TargetBase,
    pub product_install_path: Option<String>,
}

impl NativeTarget {
    pub fn new(reference: Identifier, name: impl Into<String>) -> Self {
        Self {
            base: TargetBase::new(reference, name),
            product_install_path: None,
        }
    }
}

impl PbxObject for NativeTarget {
    const ISA: Isa = Isa::NativeTarget;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: TargetBase::decode(&d)?,
            product_install_path: d.string("productInstallPath")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e, true)?;
        e.opt_string("productInstallPath", self.product_install_path.as_deref());
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.base.references()
    }

    fn display_name(&self) -> Option<String> {
        Some(self.base.name.clone())
    }
}

// ---------------------------------------------------------------------------
// PBXAggregateTarget
// ---------------------------------------------------------------------------

/// A target that only groups dependencies and script phases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateTarget {
    pub base: TargetBase,
}

impl AggregateTarget {
    pub fn new(reference: Identifier, name: impl Into<String>) -> Self {
        Self {
            base: TargetBase::new(reference, name),
        }
    }
}

impl PbxObject for AggregateTarget {
    const ISA: Isa = Isa::AggregateTarget;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: TargetBase::decode(&d)?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e, false)?;
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.base.references()
    }

    fn display_name(&self) -> Option<String> {
        Some(self.base.name.clone())
    }
}

// ---------------------------------------------------------------------------
// PBXLegacyTarget
// ---------------------------------------------------------------------------

/// An "External Build System" target that runs a build tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTarget {
    pub base: TargetBase,
    /// Path to the build tool that is invoked.
    pub build_tool_path: Option<String>,
    /// Arguments passed to the build tool.
    pub build_arguments_string: Option<String>,
    /// Whether build settings are exported to the tool's environment.
    pub pass_build_settings_in_environment: bool,
    /// Directory the build tool runs in.
    pub build_working_directory: Option<String>,
}

impl LegacyTarget {
    pub fn new(reference: Identifier, name: impl Into<String>) -> Self {
        Self {
            base: TargetBase::new(reference, name),
            build_tool_path: None,
            build_arguments_string: None,
            pass_build_settings_in_environment: false,
            build_working_directory: None,
        }
    }
}

impl PbxObject for LegacyTarget {
    const ISA: Isa = Isa::LegacyTarget;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: TargetBase::decode(&d)?,
            build_tool_path: d.string("buildToolPath")?,
            build_arguments_string: d.string("buildArgumentsString")?,
            pass_build_settings_in_environment: d.legacy_bool("passBuildSettingsInEnvironment"),
            build_working_directory: d.string("buildWorkingDirectory")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e, false)?;
        e.opt_string("buildToolPath", self.build_tool_path.as_deref());
        e.opt_string("buildArgumentsString", self.build_arguments_string.as_deref());
        e.legacy_bool(
            "passBuildSettingsInEnvironment",
            self.pass_build_settings_in_environment,
        );
        e.opt_string("buildWorkingDirectory", self.build_working_directory.as_deref());
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.base.references()
    }

    fn display_name(&self) -> Option<String> {
        Some(self.base.name.clone())
    }
}
