use pbx_objects::{Entity, EntityKind, Project};
use pbx_store::{ObjectStore, StoreResult};
use pbx_types::{Identifier, PlistDict};

use crate::error::ProjectResult;
use crate::options::CodecOptions;

/// `archiveVersion` written by every Xcode release.
pub const DEFAULT_ARCHIVE_VERSION: &str = "1";

/// `objectVersion` used for graphs built in memory (Xcode 14 format).
pub const DEFAULT_OBJECT_VERSION: &str = "56";

/// A complete project file: the object store plus top-level metadata.
///
/// The graph owns its store. Everything reachable from the root project is
/// looked up through it by identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectGraph {
    store: ObjectStore,
    archive_version: String,
    object_version: String,
    classes: PlistDict,
    root_object: Identifier,
    options: CodecOptions,
}

impl ProjectGraph {
    /// Wrap a populated store. The root must be a stored `PBXProject`.
    pub fn new(store: ObjectStore, root_object: Identifier) -> ProjectResult<Self> {
        store.get_as::<Project>(&root_object)?;
        Ok(Self {
            store,
            archive_version: DEFAULT_ARCHIVE_VERSION.to_string(),
            object_version: DEFAULT_OBJECT_VERSION.to_string(),
            classes: PlistDict::new(),
            root_object,
            options: CodecOptions::default(),
        })
    }

    pub(crate) fn from_parts(
        store: ObjectStore,
        archive_version: String,
        object_version: String,
        classes: PlistDict,
        root_object: Identifier,
        options: CodecOptions,
    ) -> Self {
        Self {
            store,
            archive_version,
            object_version,
            classes,
            root_object,
            options,
        }
    }

    /// Replace the options used by [`serialize`](crate::serialize).
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    pub fn root_object(&self) -> &Identifier {
        &self.root_object
    }

    /// The root `PBXProject`.
    pub fn project(&self) -> StoreResult<&Project> {
        self.store.get_as(&self.root_object)
    }

    pub fn project_mut(&mut self) -> StoreResult<&mut Project> {
        self.store.get_as_mut(&self.root_object)
    }

    /// Set the in-memory project name used in configuration list comments.
    pub fn set_project_name(&mut self, name: impl Into<String>) -> StoreResult<()> {
        self.project_mut()?.name = name.into();
        Ok(())
    }

    /// Typed objects of one kind, sorted by identifier.
    pub fn objects_of_kind<T: EntityKind>(&self) -> Vec<&T> {
        self.store.of_kind()
    }

    /// Resolve a relationship field's identifiers.
    pub fn resolve(&self, ids: &[Identifier]) -> StoreResult<Vec<&Entity>> {
        self.store.resolve(ids)
    }

    /// The project's targets, in the order the project lists them.
    pub fn targets(&self) -> StoreResult<Vec<&Entity>> {
        self.resolve(&self.project()?.targets)
    }

    pub fn archive_version(&self) -> &str {
        &self.archive_version
    }

    pub fn object_version(&self) -> &str {
        &self.object_version
    }

    pub fn set_object_version(&mut self, version: impl Into<String>) {
        self.object_version = version.into();
    }

    pub fn classes(&self) -> &PlistDict {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbx_objects::{ConfigurationList, Group, NativeTarget};
    use pbx_store::StoreError;

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    fn store() -> ObjectStore {
        let mut store = ObjectStore::new();
        let mut project = Project::new(id("R1"), id("C1"), id("G1"));
        project.targets = vec![id("T2"), id("T1")];
        store.insert(project).unwrap();
        store.insert(ConfigurationList::new(id("C1"), vec![])).unwrap();
        store.insert(Group::new(id("G1"))).unwrap();
        store.insert(NativeTarget::new(id("T1"), "App")).unwrap();
        store.insert(NativeTarget::new(id("T2"), "Tests")).unwrap();
        store
    }

    #[test]
    fn new_requires_project_root() {
        assert!(ProjectGraph::new(store(), id("R1")).is_ok());
        let err = ProjectGraph::new(store(), id("G1")).unwrap_err();
        assert!(matches!(
            err,
            crate::ProjectError::Store(StoreError::WrongKind { .. })
        ));
    }

    #[test]
    fn targets_follow_project_order() {
        let graph = ProjectGraph::new(store(), id("R1")).unwrap();
        let names: Vec<String> = graph
            .targets()
            .unwrap()
            .iter()
            .filter_map(|t| t.display_name())
            .collect();
        assert_eq!(names, ["Tests", "App"]);
        assert_eq!(graph.objects_of_kind::<NativeTarget>().len(), 2);
    }

    #[test]
    fn project_name_is_settable() {
        let mut graph = ProjectGraph::new(store(), id("R1")).unwrap();
        graph.set_project_name("Demo").unwrap();
        assert_eq!(graph.project().unwrap().name, "Demo");
        assert_eq!(graph.archive_version(), DEFAULT_ARCHIVE_VERSION);
        assert_eq!(graph.object_version(), DEFAULT_OBJECT_VERSION);
    }
}
