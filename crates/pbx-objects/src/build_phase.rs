//! Build phases and the build files they list.

use pbx_types::{Identifier, PlistDict, PlistValue};

use crate::decode::ObjectDecoder;
use crate::encode::{EncodeContext, ObjectEncoder};
use crate::entity::{Isa, PbxObject};
use crate::error::ObjectResult;

/// `buildActionMask` value Xcode writes for every phase it creates.
pub const DEFAULT_BUILD_ACTION_MASK: u32 = 2_147_483_647;

/// Fields shared by every build phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPhaseBase {
    pub reference: Identifier,
    pub build_action_mask: u32,
    /// `PBXBuildFile` identifiers, in build order.
    pub files: Vec<Identifier>,
    pub run_only_for_deployment_postprocessing: bool,
    /// Only copy-files and shell-script phases are usually named.
    pub name: Option<String>,
}

impl BuildPhaseBase {
    pub fn new(reference: Identifier) -> Self {
        Self {
            reference,
            build_action_mask: DEFAULT_BUILD_ACTION_MASK,
            files: Vec::new(),
            run_only_for_deployment_postprocessing: false,
            name: None,
        }
    }

    fn decode(d: &ObjectDecoder<'_>) -> ObjectResult<Self> {
        Ok(Self {
            reference: d.reference().clone(),
            build_action_mask: d
                .parsed("buildActionMask")?
                .unwrap_or(DEFAULT_BUILD_ACTION_MASK),
            files: d.references("files")?,
            run_only_for_deployment_postprocessing: d
                .legacy_bool("runOnlyForDeploymentPostprocessing"),
            name: d.string("name")?,
        })
    }

    fn encode(&self, e: &mut ObjectEncoder<'_>) -> ObjectResult<()> {
        e.string("buildActionMask", self.build_action_mask.to_string());
        e.references("files", &self.files)?;
        e.opt_string("name", self.name.as_deref());
        e.legacy_bool(
            "runOnlyForDeploymentPostprocessing",
            self.run_only_for_deployment_postprocessing,
        );
        Ok(())
    }

    fn display_name(&self, default: &str) -> String {
        self.name.clone().unwrap_or_else(|| default.to_string())
    }
}

/// Phases that carry nothing beyond [`BuildPhaseBase`].
macro_rules! simple_phase {
    ($(#[$doc:meta])* $name:ident, $isa:ident, $default:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub base: BuildPhaseBase,
        }

        impl $name {
            pub fn new(reference: Identifier) -> Self {
                Self {
                    base: BuildPhaseBase::new(reference),
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
                    base: BuildPhaseBase::decode(&d)?,
                })
            }

            fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
                let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
                self.base.encode(&mut e)?;
                Ok(e.finish())
            }

            fn references(&self) -> Vec<&Identifier> {
                self.base.files.iter().collect()
            }

            fn display_name(&self) -> Option<String> {
                Some(self.base.display_name($default))
            }
        }
    };
}

simple_phase!(
    /// Compiles source files.
    SourcesBuildPhase,
    SourcesBuildPhase,
    "Sources"
);
simple_phase!(
    /// Links frameworks and libraries.
    FrameworksBuildPhase,
    FrameworksBuildPhase,
    "Frameworks"
);
simple_phase!(
    /// Copies bundle resources.
    ResourcesBuildPhase,
    ResourcesBuildPhase,
    "Resources"
);
simple_phase!(
    /// Copies public, private, and project headers.
    HeadersBuildPhase,
    HeadersBuildPhase,
    "Headers"
);

// ---------------------------------------------------------------------------
// PBXCopyFilesBuildPhase
// ---------------------------------------------------------------------------

/// Destination of a copy-files phase (`dstSubfolderSpec`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubfolderSpec {
    AbsolutePath,
    Wrapper,
    Executables,
    Resources,
    Frameworks,
    SharedFrameworks,
    SharedSupport,
    Plugins,
    JavaResources,
    ProductsDirectory,
    Other(u32),
}

impl SubfolderSpec {
    pub fn code(&self) -> u32 {
        match self {
            Self::AbsolutePath => 0,
            Self::Wrapper => 1,
            Self::Executables => 6,
            Self::Resources => 7,
            Self::Frameworks => 10,
            Self::SharedFrameworks => 11,
            Self::SharedSupport => 12,
            Self::Plugins => 13,
            Self::JavaResources => 15,
            Self::ProductsDirectory => 16,
            Self::Other(code) => *code,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::AbsolutePath,
            1 => Self::Wrapper,
            6 => Self::Executables,
            7 => Self::Resources,
            10 => Self::Frameworks,
            11 => Self::SharedFrameworks,
            12 => Self::SharedSupport,
            13 => Self::Plugins,
            15 => Self::JavaResources,
            16 => Self::ProductsDirectory,
            other => Self::Other(other),
        }
    }
}

/// Copies files into a location inside (or outside) the product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyFilesBuildPhase {
    pub base: BuildPhaseBase,
    pub dst_path: String,
    pub dst_subfolder_spec: Option<SubfolderSpec>,
}

impl CopyFilesBuildPhase {
    pub fn new(reference: Identifier, destination: SubfolderSpec) -> Self {
        Self {
            base: BuildPhaseBase::new(reference),
            dst_path: String::new(),
            dst_subfolder_spec: Some(destination),
        }
    }
}

impl PbxObject for CopyFilesBuildPhase {
    const ISA: Isa = Isa::CopyFilesBuildPhase;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: BuildPhaseBase::decode(&d)?,
            dst_path: d.string("dstPath")?.unwrap_or_default(),
            dst_subfolder_spec: d.parsed("dstSubfolderSpec")?.map(SubfolderSpec::from_code),
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e)?;
        e.string("dstPath", self.dst_path.as_str());
        if let Some(spec) = self.dst_subfolder_spec {
            e.string("dstSubfolderSpec", spec.code().to_string());
        }
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.base.files.iter().collect()
    }

    fn display_name(&self) -> Option<String> {
        Some(self.base.display_name("CopyFiles"))
    }
}

// ---------------------------------------------------------------------------
// PBXShellScriptBuildPhase
// ---------------------------------------------------------------------------

/// Runs a shell script during the build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellScriptBuildPhase {
    pub base: BuildPhaseBase,
    pub input_paths: Vec<String>,
    pub output_paths: Vec<String>,
    /// Absent on files written before xcfilelist support; kept distinct from empty.
    pub input_file_list_paths: Option<Vec<String>>,
    pub output_file_list_paths: Option<Vec<String>>,
    pub shell_path: String,
    pub shell_script: Option<String>,
    /// Xcode only writes this key when it is `0`, so an absent key reads as `true`.
    pub show_env_vars_in_log: bool,
}

impl ShellScriptBuildPhase {
    pub fn new(reference: Identifier, script: impl Into<String>) -> Self {
        Self {
            base: BuildPhaseBase::new(reference),
            input_paths: Vec::new(),
            output_paths: Vec::new(),
            input_file_list_paths: None,
            output_file_list_paths: None,
            shell_path: "/bin/sh".to_string(),
            shell_script: Some(script.into()),
            show_env_vars_in_log: true,
        }
    }
}

impl PbxObject for ShellScriptBuildPhase {
    const ISA: Isa = Isa::ShellScriptBuildPhase;

    fn reference(&self) -> &Identifier {
        &self.base.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            base: BuildPhaseBase::decode(&d)?,
            input_paths: d.strings("inputPaths")?,
            output_paths: d.strings("outputPaths")?,
            input_file_list_paths: d.optional_strings("inputFileListPaths")?,
            output_file_list_paths: d.optional_strings("outputFileListPaths")?,
            shell_path: d.string("shellPath")?.unwrap_or_else(|| "/bin/sh".to_string()),
            shell_script: d.string("shellScript")?,
            // Absent means the Xcode default, which is to show them.
            show_env_vars_in_log: d.optional_legacy_bool("showEnvVarsInLog").unwrap_or(true),
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.base.reference, Self::ISA);
        self.base.encode(&mut e)?;
        if let Some(paths) = &self.input_file_list_paths {
            e.strings("inputFileListPaths", paths);
        }
        e.strings("inputPaths", &self.input_paths);
        if let Some(paths) = &self.output_file_list_paths {
            e.strings("outputFileListPaths", paths);
        }
        e.strings("outputPaths", &self.output_paths);
        e.string("shellPath", self.shell_path.as_str());
        e.opt_string("shellScript", self.shell_script.as_deref());
        if !self.show_env_vars_in_log {
            e.legacy_bool("showEnvVarsInLog", false);
        }
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.base.files.iter().collect()
    }

    fn display_name(&self) -> Option<String> {
        Some(self.base.display_name("ShellScript"))
    }
}

// ---------------------------------------------------------------------------
// PBXBuildFile
// ---------------------------------------------------------------------------

/// One file's membership in a build phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildFile {
    pub reference: Identifier,
    pub file_ref: Option<Identifier>,
    /// Per-file settings such as `ATTRIBUTES` or `COMPILER_FLAGS`.
    pub settings: Option<PlistDict>,
}

impl BuildFile {
    pub fn new(reference: Identifier, file_ref: Identifier) -> Self {
        Self {
            reference,
            file_ref: Some(file_ref),
            settings: None,
        }
    }
}

impl PbxObject for BuildFile {
    const ISA: Isa = Isa::BuildFile;

    fn reference(&self) -> &Identifier {
        &self.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        Ok(Self {
            reference: reference.clone(),
            file_ref: d.reference_field("fileRef")?,
            settings: d.dict("settings")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.reference, Self::ISA);
        e.opt_reference("fileRef", self.file_ref.as_ref())?;
        if let Some(settings) = &self.settings {
            e.value("settings", PlistValue::Dictionary(settings.clone()));
        }
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        self.file_ref.iter().collect()
    }

    /// Context-free part only; the encode context adds the phase name.
    fn display_name(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use pbx_types::CommentedString;

    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    fn fields(pairs: &[(&str, &str)]) -> PlistDict {
        pairs
            .iter()
            .map(|(k, v)| (CommentedString::new(*k), PlistValue::from(*v)))
            .collect()
    }

    #[test]
    fn phase_defaults_when_fields_absent() {
        let phase = SourcesBuildPhase::decode(&id("P1"), &fields(&[])).unwrap();
        assert_eq!(phase.base.build_action_mask, DEFAULT_BUILD_ACTION_MASK);
        assert!(phase.base.files.is_empty());
        assert!(!phase.base.run_only_for_deployment_postprocessing);
        assert_eq!(phase.display_name().as_deref(), Some("Sources"));
    }

    #[test]
    fn named_phase_uses_its_name() {
        let phase =
            CopyFilesBuildPhase::decode(&id("P1"), &fields(&[("name", "Embed Frameworks")]))
                .unwrap();
        assert_eq!(phase.display_name().as_deref(), Some("Embed Frameworks"));
    }

    #[test]
    fn subfolder_spec_codes() {
        let phase = CopyFilesBuildPhase::decode(
            &id("P1"),
            &fields(&[("dstSubfolderSpec", "10"), ("dstPath", "")]),
        )
        .unwrap();
        assert_eq!(phase.dst_subfolder_spec, Some(SubfolderSpec::Frameworks));
        assert_eq!(SubfolderSpec::from_code(99), SubfolderSpec::Other(99));
        assert_eq!(SubfolderSpec::Other(99).code(), 99);
    }

    #[test]
    fn shell_script_defaults() {
        let phase = ShellScriptBuildPhase::decode(&id("S1"), &fields(&[])).unwrap();
        assert_eq!(phase.shell_path, "/bin/sh");
        assert!(phase.show_env_vars_in_log);
        assert_eq!(phase.input_file_list_paths, None);

        let quiet =
            ShellScriptBuildPhase::decode(&id("S1"), &fields(&[("showEnvVarsInLog", "0")]))
                .unwrap();
        assert!(!quiet.show_env_vars_in_log);
    }

    #[test]
    fn show_env_vars_only_written_when_false() {
        let lookup = NoObjects;
        let ctx = EncodeContext::new(&lookup);
        let mut phase = ShellScriptBuildPhase::new(id("S1"), "echo hi");
        let dict = phase.encode(&ctx).unwrap();
        assert!(!dict.contains_key("showEnvVarsInLog"));

        phase.show_env_vars_in_log = false;
        let dict = phase.encode(&ctx).unwrap();
        assert_eq!(dict.get("showEnvVarsInLog").unwrap().as_str(), Some("0"));
    }

    struct NoObjects;

    impl crate::encode::ObjectLookup for NoObjects {
        fn object(&self, _: &Identifier) -> Option<&crate::entity::Entity> {
            None
        }

        fn objects(&self) -> Vec<&crate::entity::Entity> {
            Vec::new()
        }
    }
}
