//! Target dependencies, cross-project proxies, and custom build rules.

use pbx_types::{Identifier, PlistDict};

use crate::decode::ObjectDecoder;
use crate::encode::{EncodeContext, ObjectEncoder};
use crate::entity::{Isa, PbxObject};
use crate::error::ObjectResult;

/// `PBXTargetDependency`: one target depending on another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetDependency {
    pub reference: Identifier,
    pub name: Option<String>,
    /// Target in this project; absent for cross-project dependencies.
    pub target: Option<Identifier>,
    pub target_proxy: Option<Identifier>,
}

impl PbxObject for TargetDependency {
    const ISA: Isa = Isa::TargetDependency;

    fn reference(&self) -> &Identifier {
        &self.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            reference: reference.clone(),
            name: d.string("name")?,
            target: d.reference_field("target")?,
            target_proxy: d.reference_field("targetProxy")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.reference, Self::ISA);
        e.opt_string("name", self.name.as_deref());
        e.opt_reference("target", self.target.as_ref())?;
        e.opt_reference("targetProxy", self.target_proxy.as_ref())?;
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.target.iter().chain(&self.target_proxy).collect()
    }

    fn display_name(&self) -> Option<String> {
        Some(Self::ISA.as_str().to_string())
    }
}

/// `proxyType` of a container item proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProxyType {
    /// Points at a target.
    NativeTarget,
    /// Points at a file reference (product of another project).
    Reference,
    Other(u32),
}

impl ProxyType {
    pub fn code(&self) -> u32 {
        match self {
            Self::NativeTarget => 1,
            Self::Reference => 2,
            Self::Other(code) => *code,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::NativeTarget,
            2 => Self::Reference,
            other => Self::Other(other),
        }
    }
}

/// `PBXContainerItemProxy`: an indirection to an object that may live in
/// another project file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerItemProxy {
    pub reference: Identifier,
    /// The project (this one, or a file reference to another) containing the item.
    pub container_portal: Identifier,
    pub proxy_type: ProxyType,
    /// Identifier inside the container's own object table. Not resolved
    /// against this graph and written without a comment.
    pub remote_global_id_string: Option<String>,
    pub remote_info: Option<String>,
}

impl PbxObject for ContainerItemProxy {
    const ISA: Isa = Isa::ContainerItemProxy;

    fn reference(&self) -> &Identifier {
        &self.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            reference: reference.clone(),
            container_portal: d.required_reference("containerPortal")?,
            proxy_type: d
                .parsed("proxyType")?
                .map(ProxyType::from_code)
                .unwrap_or(ProxyType::NativeTarget),
            remote_global_id_string: d.string("remoteGlobalIDString")?,
            remote_info: d.string("remoteInfo")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.reference, Self::ISA);
        e.reference("containerPortal", &self.container_portal)?;
        e.string("proxyType", self.proxy_type.code().to_string());
        e.opt_string("remoteGlobalIDString", self.remote_global_id_string.as_deref());
        e.opt_string("remoteInfo", self.remote_info.as_deref());
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        vec![&self.container_portal]
    }

    fn display_name(&self) -> Option<String> {
        Some(Self::ISA.as_str().to_string())
    }
}

/// `PBXBuildRule`: a custom compiler or script for matching files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildRule {
    pub reference: Identifier,
    pub name: Option<String>,
    pub compiler_spec: String,
    pub file_type: String,
    pub file_patterns: Option<String>,
    pub is_editable: bool,
    pub output_files: Vec<String>,
    pub script: Option<String>,
}

impl PbxObject for BuildRule {
    const ISA: Isa = Isa::BuildRule;

    fn reference(&self) -> &Identifier {
        &self.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            reference: reference.clone(),
            name: d.string("name")?,
            compiler_spec: d.required_string("compilerSpec")?,
            file_type: d.required_string("fileType")?,
            file_patterns: d.string("filePatterns")?,
            is_editable: d.legacy_bool("isEditable"),
            output_files: d.strings("outputFiles")?,
            script: d.string("script")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.reference, Self::ISA);
        e.string("compilerSpec", self.compiler_spec.as_str());
        e.opt_string("filePatterns", self.file_patterns.as_deref());
        e.string("fileType", self.file_type.as_str());
        e.legacy_bool("isEditable", self.is_editable);
        e.opt_string("name", self.name.as_deref());
        e.strings("outputFiles", &self.output_files);
        e.opt_string("script", self.script.as_deref());
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        Vec::new()
    }

    fn display_name(&self) -> Option<String> {
        Some(Self::ISA.as_str().to_string())
    }
}
