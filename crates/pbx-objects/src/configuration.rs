//! Build configurations and the lists that group them.

use pbx_types::{Identifier, PlistDict, PlistValue};

use crate::decode::ObjectDecoder;
use crate::encode::{EncodeContext, ObjectEncoder};
use crate::entity::{Isa, PbxObject};
use crate::error::ObjectResult;

/// `XCConfigurationList`: the configurations of one project or target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigurationList {
    pub reference: Identifier,
    pub build_configurations: Vec<Identifier>,
    pub default_configuration_is_visible: bool,
    pub default_configuration_name: Option<String>,
}

impl ConfigurationList {
    pub fn new(reference: Identifier, build_configurations: Vec<Identifier>) -> Self {
        Self {
            reference,
            build_configurations,
            default_configuration_is_visible: false,
            default_configuration_name: None,
        }
    }
}

impl PbxObject for ConfigurationList {
    const ISA: Isa = Isa::ConfigurationList;

    fn reference(&self) -> &Identifier {
        &self.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            reference: reference.clone(),
            build_configurations: d.references("buildConfigurations")?,
            default_configuration_is_visible: d.legacy_bool("defaultConfigurationIsVisible"),
            default_configuration_name: d.string("defaultConfigurationName")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.reference, Self::ISA);
        e.references("buildConfigurations", &self.build_configurations)?;
        e.legacy_bool(
            "defaultConfigurationIsVisible",
            self.default_configuration_is_visible,
        );
        e.opt_string(
            "defaultConfigurationName",
            self.default_configuration_name.as_deref(),
        );
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.build_configurations.iter().collect()
    }

    /// Owner-dependent; filled in by the encode context.
    fn display_name(&self) -> Option<String> {
        None
    }
}

/// `XCBuildConfiguration`: one named set of build settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub reference: Identifier,
    pub name: String,
    /// An `.xcconfig` file reference layered under `build_settings`.
    pub base_configuration_reference: Option<Identifier>,
    pub build_settings: PlistDict,
}

impl BuildConfiguration {
    pub fn new(reference: Identifier, name: impl Into<String>) -> Self {
        Self {
            reference,
            name: name.into(),
            base_configuration_reference: None,
            build_settings: PlistDict::new(),
        }
    }

    /// A single-valued build setting.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.build_settings.get(key).and_then(PlistValue::as_str)
    }
}

impl PbxObject for BuildConfiguration {
    const ISA: Isa = Isa::BuildConfiguration;

    fn reference(&self) -> &Identifier {
        &self.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            reference: reference.clone(),
            name: d.required_string("name")?,
            base_configuration_reference: d.reference_field("baseConfigurationReference")?,
            build_settings: d.dict("buildSettings")?.unwrap_or_default(),
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.reference, Self::ISA);
        e.opt_reference(
            "baseConfigurationReference",
            self.base_configuration_reference.as_ref(),
        )?;
        e.value(
            "buildSettings",
            PlistValue::Dictionary(self.build_settings.clone()),
        );
        e.string("name", self.name.as_str());
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.base_configuration_reference.iter().collect()
    }

    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}
