//! The closed set of object kinds and the [`Entity`] sum type over them.

use std::fmt;
use std::str::FromStr;

use pbx_types::{Identifier, PlistDict, ValueKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::build_phase::{
    BuildFile, BuildPhaseBase, CopyFilesBuildPhase, FrameworksBuildPhase, HeadersBuildPhase,
    ResourcesBuildPhase, ShellScriptBuildPhase, SourcesBuildPhase,
};
use crate::configuration::{BuildConfiguration, ConfigurationList};
use crate::dependency::{BuildRule, ContainerItemProxy, TargetDependency};
use crate::encode::EncodeContext;
use crate::error::{ObjectError, ObjectResult};
use crate::file_element::{FileReference, Group, ReferenceProxy, VariantGroup, VersionGroup};
use crate::project::Project;
use crate::target::{AggregateTarget, LegacyTarget, NativeTarget, TargetBase};

/// Behaviour shared by every object variant.
pub trait PbxObject: Sized {
    /// The `isa` tag this variant is stored under.
    const ISA: Isa;

    fn reference(&self) -> &Identifier;

    /// Build the variant from its dictionary. Unknown keys are ignored.
    fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self>;

    /// The dictionary for this object, `isa` first and remaining keys sorted.
    fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict>;

    /// Every identifier held in a relationship field.
    fn references(&self) -> Vec<&Identifier>;

    /// Text of the comment written next to references to this object.
    fn display_name(&self) -> Option<String>;
}

/// Typed access to one variant of [`Entity`].
pub trait EntityKind: PbxObject {
    fn from_entity(entity: &Entity) -> Option<&Self>;
    fn from_entity_mut(entity: &mut Entity) -> Option<&mut Self>;
}

macro_rules! entities {
    ($($variant:ident => $isa:literal),+ $(,)?) => {
        /// Object kind tag, as written in the `isa` field.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Isa {
            $($variant,)+
        }

        impl Isa {
            /// Every kind, in no particular order.
            pub const ALL: &'static [Isa] = &[$(Isa::$variant,)+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Isa::$variant => $isa,)+
                }
            }

            /// Look up a tag. `None` for kinds this crate does not model.
            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($isa => Some(Isa::$variant),)+
                    _ => None,
                }
            }
        }

        /// One object of the project graph.
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum Entity {
            $($variant($variant),)+
        }

        impl Entity {
            pub fn isa(&self) -> Isa {
                match self {
                    $(Entity::$variant(_) => Isa::$variant,)+
                }
            }

            pub fn reference(&self) -> &Identifier {
                match self {
                    $(Entity::$variant(e) => e.reference(),)+
                }
            }

            /// Decode an object from its dictionary, dispatching on `isa`.
            pub fn decode(reference: &Identifier, fields: &PlistDict) -> ObjectResult<Self> {
                let value = fields.get("isa").ok_or_else(|| ObjectError::MissingField {
                    reference: reference.clone(),
                    isa: String::new(),
                    field: "isa".to_string(),
                })?;
                let tag = value.as_str().ok_or_else(|| ObjectError::TypeMismatch {
                    reference: reference.clone(),
                    field: "isa".to_string(),
                    expected: ValueKind::String,
                    found: value.kind(),
                })?;
                match Isa::from_tag(tag) {
                    $(Some(Isa::$variant) => $variant::decode(reference, fields).map(Entity::$variant),)+
                    None => Err(ObjectError::UnknownEntityKind {
                        reference: reference.clone(),
                        isa: tag.to_string(),
                    }),
                }
            }

            pub fn encode(&self, ctx: &EncodeContext) -> ObjectResult<PlistDict> {
                match self {
                    $(Entity::$variant(e) => e.encode(ctx),)+
                }
            }

            pub fn references(&self) -> Vec<&Identifier> {
                match self {
                    $(Entity::$variant(e) => e.references(),)+
                }
            }

            pub fn display_name(&self) -> Option<String> {
                match self {
                    $(Entity::$variant(e) => e.display_name(),)+
                }
            }

            /// Typed view of this entity.
            pub fn downcast_ref<T: EntityKind>(&self) -> Option<&T> {
                T::from_entity(self)
            }

            pub fn downcast_mut<T: EntityKind>(&mut self) -> Option<&mut T> {
                T::from_entity_mut(self)
            }
        }

        $(
            impl From<$variant> for Entity {
                fn from(value: $variant) -> Self {
                    Entity::$variant(value)
                }
            }

            impl EntityKind for $variant {
                fn from_entity(entity: &Entity) -> Option<&Self> {
                    match entity {
                        Entity::$variant(e) => Some(e),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn from_entity_mut(entity: &mut Entity) -> Option<&mut Self> {
                    match entity {
                        Entity::$variant(e) => Some(e),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }

            impl<'a> TryFrom<&'a Entity> for &'a $variant {
                type Error = Isa;

                /// Fails with the entity's actual kind.
                fn try_from(entity: &'a Entity) -> Result<Self, Self::Error> {
                    $variant::from_entity(entity).ok_or_else(|| entity.isa())
                }
            }
        )+
    };
}

entities! {
    NativeTarget => "PBXNativeTarget",
    AggregateTarget => "PBXAggregateTarget",
    LegacyTarget => "PBXLegacyTarget",
    SourcesBuildPhase => "PBXSourcesBuildPhase",
    FrameworksBuildPhase => "PBXFrameworksBuildPhase",
    ResourcesBuildPhase => "PBXResourcesBuildPhase",
    HeadersBuildPhase => "PBXHeadersBuildPhase",
    CopyFilesBuildPhase => "PBXCopyFilesBuildPhase",
    ShellScriptBuildPhase => "PBXShellScriptBuildPhase",
    BuildFile => "PBXBuildFile",
    FileReference => "PBXFileReference",
    Group => "PBXGroup",
    VariantGroup => "PBXVariantGroup",
    VersionGroup => "XCVersionGroup",
    ReferenceProxy => "PBXReferenceProxy",
    Project => "PBXProject",
    ConfigurationList => "XCConfigurationList",
    BuildConfiguration => "XCBuildConfiguration",
    TargetDependency => "PBXTargetDependency",
    ContainerItemProxy => "PBXContainerItemProxy",
    BuildRule => "PBXBuildRule",
}

impl Isa {
    /// Whether objects of this kind are written on a single line.
    pub fn is_inline(&self) -> bool {
        matches!(self, Isa::BuildFile | Isa::FileReference)
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Isa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Isa::from_tag(s).ok_or_else(|| format!("unknown isa `{s}`"))
    }
}

impl PartialOrd for Isa {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered by tag text, which is the section order in a project file.
impl Ord for Isa {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Serialize for Isa {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Isa {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

impl Entity {
    /// The shared target fields, for any target kind.
    pub fn target(&self) -> Option<&TargetBase> {
        match self {
            Entity::NativeTarget(t) => Some(&t.base),
            Entity::AggregateTarget(t) => Some(&t.base),
            Entity::LegacyTarget(t) => Some(&t.base),
            _ => None,
        }
    }

    /// The shared build phase fields, for any phase kind.
    pub fn build_phase(&self) -> Option<&BuildPhaseBase> {
        match self {
            Entity::SourcesBuildPhase(p) => Some(&p.base),
            Entity::FrameworksBuildPhase(p) => Some(&p.base),
            Entity::ResourcesBuildPhase(p) => Some(&p.base),
            Entity::HeadersBuildPhase(p) => Some(&p.base),
            Entity::CopyFilesBuildPhase(p) => Some(&p.base),
            Entity::ShellScriptBuildPhase(p) => Some(&p.base),
            _ => None,
        }
    }

    /// The configuration list owned by a project or target.
    pub fn build_configuration_list(&self) -> Option<&Identifier> {
        match self {
            Entity::Project(p) => Some(&p.build_configuration_list),
            _ => self
                .target()
                .and_then(|t| t.build_configuration_list.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pbx_types::{CommentedString, PlistValue};

    use super::*;
    use crate::encode::ObjectLookup;
    use crate::file_element::SourceTree;

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    fn fields(pairs: &[(&str, PlistValue)]) -> PlistDict {
        pairs
            .iter()
            .map(|(k, v)| (CommentedString::new(*k), v.clone()))
            .collect()
    }

    /// Minimal lookup over a map, standing in for the object store.
    #[derive(Default)]
    struct Objects(HashMap<Identifier, Entity>);

    impl Objects {
        fn with(mut self, entity: impl Into<Entity>) -> Self {
            let entity = entity.into();
            self.0.insert(entity.reference().clone(), entity);
            self
        }
    }

    impl ObjectLookup for Objects {
        fn object(&self, id: &Identifier) -> Option<&Entity> {
            self.0.get(id)
        }

        fn objects(&self) -> Vec<&Entity> {
            self.0.values().collect()
        }
    }

    fn keys(dict: &PlistDict) -> Vec<&str> {
        dict.keys().map(|k| k.value()).collect()
    }

    #[test]
    fn decode_dispatches_on_isa() {
        let dict = fields(&[
            ("isa", "PBXGroup".into()),
            ("children", PlistValue::Array(vec![])),
            ("sourceTree", "<group>".into()),
        ]);
        let entity = Entity::decode(&id("G1"), &dict).unwrap();
        assert_eq!(entity.isa(), Isa::Group);
        assert_eq!(entity.reference(), &id("G1"));
    }

    #[test]
    fn decode_without_isa_is_missing_field() {
        let err = Entity::decode(&id("X"), &PlistDict::new()).unwrap_err();
        assert!(matches!(err, ObjectError::MissingField { ref field, .. } if field == "isa"));
    }

    #[test]
    fn non_string_isa_is_type_mismatch() {
        let dict = fields(&[("isa", PlistDict::new().into())]);
        let err = Entity::decode(&id("X"), &dict).unwrap_err();
        assert_eq!(
            err,
            ObjectError::TypeMismatch {
                reference: id("X"),
                field: "isa".into(),
                expected: ValueKind::String,
                found: ValueKind::Dictionary,
            }
        );
    }

    #[test]
    fn decode_unknown_isa() {
        let dict = fields(&[("isa", "PBXSwiftPackageThing".into())]);
        let err = Entity::decode(&id("X"), &dict).unwrap_err();
        assert_eq!(
            err,
            ObjectError::UnknownEntityKind {
                reference: id("X"),
                isa: "PBXSwiftPackageThing".into(),
            }
        );
    }

    #[test]
    fn target_missing_name_fails() {
        let dict = fields(&[("isa", "PBXNativeTarget".into())]);
        let err = Entity::decode(&id("T1"), &dict).unwrap_err();
        assert_eq!(
            err,
            ObjectError::MissingField {
                reference: id("T1"),
                isa: "PBXNativeTarget".into(),
                field: "name".into(),
            }
        );
    }

    #[test]
    fn legacy_target_flag_round_trips_as_zero_or_one() {
        for (input, expected) in [("1", true), ("0", false), ("YES", false)] {
            let dict = fields(&[
                ("isa", "PBXLegacyTarget".into()),
                ("name", "External".into()),
                ("passBuildSettingsInEnvironment", input.into()),
            ]);
            let entity = Entity::decode(&id("L1"), &dict).unwrap();
            let Entity::LegacyTarget(target) = &entity else {
                panic!("expected legacy target");
            };
            assert_eq!(target.pass_build_settings_in_environment, expected);

            let ctx = EncodeContext::new(&Objects::default().with(target.clone()));
            let encoded = entity.encode(&ctx).unwrap();
            let written = encoded.get("passBuildSettingsInEnvironment").unwrap();
            assert_eq!(written.as_str(), Some(if expected { "1" } else { "0" }));
        }
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dict = fields(&[
            ("isa", "PBXFileReference".into()),
            ("path", "main.swift".into()),
            ("usesTabs", "1".into()),
        ]);
        let entity = Entity::decode(&id("F1"), &dict).unwrap();
        assert_eq!(entity.display_name().as_deref(), Some("main.swift"));
    }

    #[test]
    fn encode_orders_isa_first_then_bytewise() {
        let mut file = FileReference::new(id("F1"), "main.swift", SourceTree::Group);
        file.last_known_file_type = Some("sourcecode.swift".into());
        file.include_in_index = Some(false);
        let objects = Objects::default().with(file.clone());
        let ctx = EncodeContext::new(&objects);
        let dict = file.encode(&ctx).unwrap();
        assert_eq!(
            keys(&dict),
            ["isa", "includeInIndex", "lastKnownFileType", "path", "sourceTree"]
        );
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let group = Group::new(id("G1"));
        let ctx = EncodeContext::new(&Objects::default().with(group.clone()));
        let dict = group.encode(&ctx).unwrap();
        assert_eq!(keys(&dict), ["isa", "children"]);
    }

    #[test]
    fn build_file_comment_names_file_and_phase() {
        let file = FileReference::new(id("F1"), "AppDelegate.m", SourceTree::Group);
        let build_file = BuildFile::new(id("B1"), id("F1"));
        let mut phase = SourcesBuildPhase::new(id("P1"));
        phase.base.files.push(id("B1"));
        let objects = Objects::default()
            .with(file)
            .with(build_file)
            .with(phase.clone());
        let ctx = EncodeContext::new(&objects);
        assert_eq!(ctx.comment(&id("B1")), Some("AppDelegate.m in Sources"));

        let dict = phase.encode(&ctx).unwrap();
        let files = dict.get("files").unwrap().as_array().unwrap();
        assert_eq!(files[0].comment(), Some("AppDelegate.m in Sources"));
    }

    #[test]
    fn configuration_list_comment_names_owner() {
        let list = ConfigurationList::new(id("C1"), vec![]);
        let mut target = NativeTarget::new(id("T1"), "App");
        target.base.build_configuration_list = Some(id("C1"));
        let mut project = Project::new(id("R1"), id("C2"), id("G1"));
        project.name = "Demo".into();
        let objects = Objects::default()
            .with(list)
            .with(ConfigurationList::new(id("C2"), vec![]))
            .with(target)
            .with(project)
            .with(Group::new(id("G1")));
        let ctx = EncodeContext::new(&objects);
        assert_eq!(
            ctx.comment(&id("C1")),
            Some("Build configuration list for PBXNativeTarget \"App\"")
        );
        assert_eq!(
            ctx.comment(&id("C2")),
            Some("Build configuration list for PBXProject \"Demo\"")
        );
        assert_eq!(ctx.comment(&id("R1")), Some("Project object"));
        assert_eq!(ctx.comment(&id("G1")), None);
    }

    #[test]
    fn shared_objects_get_the_same_comment_every_time() {
        fn shared() -> Objects {
            let mut sources = SourcesBuildPhase::new(id("P1"));
            sources.base.files.push(id("B1"));
            let mut resources = ResourcesBuildPhase::new(id("P2"));
            resources.base.files.push(id("B1"));
            let mut one = NativeTarget::new(id("T1"), "One");
            one.base.build_configuration_list = Some(id("C2"));
            let mut two = NativeTarget::new(id("T2"), "Two");
            two.base.build_configuration_list = Some(id("C2"));
            Objects::default()
                .with(FileReference::new(id("F1"), "a.m", SourceTree::Group))
                .with(BuildFile::new(id("B1"), id("F1")))
                .with(sources)
                .with(resources)
                .with(ConfigurationList::new(id("C2"), vec![]))
                .with(one)
                .with(two)
        }

        // Each map gets its own hash seed, so iteration order varies.
        for _ in 0..50 {
            let ctx = EncodeContext::new(&shared());
            assert_eq!(ctx.comment(&id("B1")), Some("a.m in Resources"));
            assert_eq!(
                ctx.comment(&id("C2")),
                Some("Build configuration list for PBXNativeTarget \"One\"")
            );
        }
    }

    #[test]
    fn dangling_reference_is_reported() {
        let mut group = Group::new(id("G1"));
        group.children.push(id("GONE"));
        let ctx = EncodeContext::new(&Objects::default().with(group.clone()));
        let err = group.encode(&ctx).unwrap_err();
        assert_eq!(
            err,
            ObjectError::DanglingReference {
                owner: id("G1"),
                reference: id("GONE"),
            }
        );

        let lenient = ctx.without_validation();
        let dict = group.encode(&lenient).unwrap();
        let children = dict.get("children").unwrap().as_array().unwrap();
        assert_eq!(children[0].as_str(), Some("GONE"));
        assert_eq!(children[0].comment(), None);
    }

    #[test]
    fn remote_global_id_is_plain_text() {
        let mut project = Project::new(id("R1"), id("C1"), id("G1"));
        project.name = "Demo".into();
        let proxy = ContainerItemProxy {
            reference: id("X1"),
            container_portal: id("R1"),
            proxy_type: crate::dependency::ProxyType::NativeTarget,
            remote_global_id_string: Some("ELSEWHERE".into()),
            remote_info: Some("Lib".into()),
        };
        let objects = Objects::default()
            .with(project)
            .with(ConfigurationList::new(id("C1"), vec![]))
            .with(Group::new(id("G1")))
            .with(proxy.clone());
        let dict = proxy.encode(&EncodeContext::new(&objects)).unwrap();
        let remote = dict.get("remoteGlobalIDString").unwrap();
        assert_eq!(remote.as_str(), Some("ELSEWHERE"));
        assert_eq!(remote.comment(), None);
        assert_eq!(dict.get("containerPortal").unwrap().comment(), Some("Project object"));
        assert_eq!(dict.get("proxyType").unwrap().as_str(), Some("1"));
    }

    #[test]
    fn equality_is_per_variant() {
        let group: Entity = Group::new(id("G1")).into();
        let variant: Entity = VariantGroup::new(id("G1")).into();
        assert_ne!(group, variant);
        assert_eq!(group, Entity::from(Group::new(id("G1"))));
    }

    #[test]
    fn typed_access() {
        let mut entity: Entity = NativeTarget::new(id("T1"), "App").into();
        assert!(entity.downcast_ref::<AggregateTarget>().is_none());
        entity
            .downcast_mut::<NativeTarget>()
            .unwrap()
            .base
            .name = "Renamed".into();
        let target: &NativeTarget = (&entity).try_into().unwrap();
        assert_eq!(target.base.name, "Renamed");
        let wrong: Result<&Group, Isa> = (&entity).try_into();
        assert_eq!(wrong.unwrap_err(), Isa::NativeTarget);
    }

    #[test]
    fn isa_orders_by_tag_text() {
        let mut kinds = vec![Isa::BuildConfiguration, Isa::BuildFile, Isa::Project];
        kinds.sort();
        assert_eq!(kinds, [Isa::BuildFile, Isa::Project, Isa::BuildConfiguration]);
        assert_eq!(Isa::ALL.len(), 21);
        assert_eq!("XCVersionGroup".parse::<Isa>().unwrap(), Isa::VersionGroup);
    }

    #[test]
    fn isa_serializes_as_tag() {
        let json = serde_json::to_string(&Isa::ShellScriptBuildPhase).unwrap();
        assert_eq!(json, "\"PBXShellScriptBuildPhase\"");
    }
}
