//! The project root object.

use pbx_types::{CommentedString, Identifier, PlistDict, PlistValue};

use crate::decode::ObjectDecoder;
use crate::encode::{EncodeContext, ObjectEncoder};
use crate::entity::{Isa, PbxObject};
use crate::error::{ObjectError, ObjectResult};

/// A reference to another `.xcodeproj` embedded in this one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectReference {
    /// Group holding the other project's products.
    pub product_group: Identifier,
    /// File reference to the other project.
    pub project_ref: Identifier,
}

/// `PBXProject`: the root of the object graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub reference: Identifier,
    /// Not stored in the file; only used to render the configuration list
    /// comment. Usually the `.xcodeproj` directory name without extension.
    pub name: String,
    /// Free-form attributes (`LastUpgradeCheck`, `TargetAttributes`, ...).
    pub attributes: PlistDict,
    pub build_configuration_list: Identifier,
    pub compatibility_version: Option<String>,
    pub development_region: Option<String>,
    pub has_scanned_for_encodings: bool,
    pub known_regions: Vec<String>,
    pub main_group: Identifier,
    pub product_ref_group: Option<Identifier>,
    pub project_dir_path: String,
    pub project_references: Option<Vec<ProjectReference>>,
    pub project_root: String,
    pub targets: Vec<Identifier>,
}

impl Project {
    pub fn new(
        reference: Identifier,
        build_configuration_list: Identifier,
        main_group: Identifier,
    ) -> Self {
        Self {
            reference,
            name: String::new(),
            attributes: PlistDict::new(),
            build_configuration_list,
            compatibility_version: None,
            development_region: None,
            has_scanned_for_encodings: false,
            known_regions: Vec::new(),
            main_group,
            product_ref_group: None,
            project_dir_path: String::new(),
            project_references: None,
            project_root: String::new(),
            targets: Vec::new(),
        }
    }

    fn decode_project_reference(
        d: &ObjectDecoder<'_>,
        dict: &PlistDict,
    ) -> ObjectResult<ProjectReference> {
        let field = |key: &str| -> ObjectResult<Identifier> {
            dict.get(key)
                .and_then(PlistValue::as_str)
                .and_then(|s| Identifier::new(s).ok())
                .ok_or_else(|| ObjectError::MissingField {
                    reference: d.reference().clone(),
                    isa: Isa::Project.as_str().to_string(),
                    field: format!("projectReferences.{key}"),
                })
        };
        Ok(ProjectReference {
            product_group: field("ProductGroup")?,
            project_ref: field("ProjectRef")?,
        })
    }
}

impl PbxObject for Project {
    const ISA: Isa = Isa::Project;

    fn reference(&self) -> &Identifier {
        &self.reference
    }

    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
        let d = ObjectDecoder::new(reference, Self::ISA.as_str(), fields);
        let project_references = match d.dicts("projectReferences")? {
            Some(dicts) => Some(
                dicts
                    .iter()
                    .map(|dict| Self::decode_project_reference(&d, dict))
                    .collect::<ObjectResult<Vec<_>>>()?,
            ),
            None => None,
        };
        Ok(Self {
            reference: reference.clone(),
            name: String::new(),
            attributes: d.dict("attributes")?.unwrap_or_default(),
            build_configuration_list: d.required_reference("buildConfigurationList")?,
            compatibility_version: d.string("compatibilityVersion")?,
            development_region: d.string("developmentRegion")?,
            has_scanned_for_encodings: d.legacy_bool("hasScannedForEncodings"),
            known_regions: d.strings("knownRegions")?,
            main_group: d.required_reference("mainGroup")?,
            product_ref_group: d.reference_field("productRefGroup")?,
            project_dir_path: d.string("projectDirPath")?.unwrap_or_default(),
            project_references,
            project_root: d.string("projectRoot")?.unwrap_or_default(),
            targets: d.references("targets")?,
        })
    }

    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
        let mut e = ObjectEncoder::new(ctx, &self.reference, Self::ISA);
        e.value("attributes", PlistValue::Dictionary(self.attributes.clone()));
        e.reference("buildConfigurationList", &self.build_configuration_list)?;
        e.opt_string("compatibilityVersion", self.compatibility_version.as_deref());
        e.opt_string("developmentRegion", self.development_region.as_deref());
        e.legacy_bool("hasScannedForEncodings", self.has_scanned_for_encodings);
        e.strings("knownRegions", &self.known_regions);
        e.reference("mainGroup", &self.main_group)?;
        e.opt_reference("productRefGroup", self.product_ref_group.as_ref())?;
        e.string("projectDirPath", self.project_dir_path.as_str());
        if let Some(references) = &self.project_references {
            let mut items = Vec::with_capacity(references.len());
            for r in references {
                let mut dict = PlistDict::new();
                dict.insert(
                    CommentedString::new("ProductGroup"),
                    e.commented_reference(&r.product_group)?,
                );
                dict.insert(
                    CommentedString::new("ProjectRef"),
                    e.commented_reference(&r.project_ref)?,
                );
                items.push(PlistValue::Dictionary(dict));
            }
            e.value("projectReferences", PlistValue::Array(items));
        }
        e.string("projectRoot", self.project_root.as_str());
        e.references("targets", &self.targets)?;
        Ok(e.finish())
    }

    fn references(&self) -> Vec<&Identifier> {
        let mut refs = vec![&self.build_configuration_list, &self.main_group];
        refs.extend(&self.product_ref_group);
        if let Some(references) = &self.project_references {
            for r in references {
                refs.push(&r.product_group);
                refs.push(&r.project_ref);
            }
        }
        refs.extend(&self.targets);
        refs
    }

    fn display_name(&self) -> Option<String> {
        Some("Project object".to_string())
    }
}
