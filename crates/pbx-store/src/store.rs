use std::collections::HashMap;

use pbx_objects::{Entity, EntityKind, Isa, ObjectLookup};
use pbx_types::Identifier;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Arena of project objects keyed by identifier.
///
/// Entities are only handed out by reference. Mutation goes through
/// [`get_mut`](Self::get_mut) or [`get_as_mut`](Self::get_as_mut).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ObjectStore {
    objects: HashMap<Identifier, Entity>,
}

impl ObjectStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Store an entity under its own identifier.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> StoreResult<Identifier> {
        let entity = entity.into();
        let id = entity.reference().clone();
        if self.objects.contains_key(&id) {
            return Err(StoreError::DuplicateIdentifier(id));
        }
        debug!(id = %id, isa = %entity.isa(), "inserting object");
        self.objects.insert(id.clone(), entity);
        Ok(id)
    }

    /// Store a new entity under a freshly generated identifier.
    ///
    /// `build` receives the identifier and must construct the entity with it
    /// as its reference.
    pub fn insert_new<F, E>(&mut self, build: F) -> StoreResult<Identifier>
    where
        F: FnOnce(Identifier) -> E,
        E: Into<Entity>,
    {
        let id = self.fresh_identifier();
        let entity = build(id.clone()).into();
        if entity.reference() != &id {
            return Err(StoreError::ReferenceMismatch {
                expected: id,
                found: entity.reference().clone(),
            });
        }
        self.insert(entity)
    }

    /// A random identifier not used by any stored object.
    pub fn fresh_identifier(&self) -> Identifier {
        loop {
            let id = Identifier::generate();
            if !self.objects.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.objects.contains_key(id)
    }

    pub fn get(&self, id: &Identifier) -> StoreResult<&Entity> {
        self.objects
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn get_mut(&mut self, id: &Identifier) -> StoreResult<&mut Entity> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Typed lookup: fails with `WrongKind` if the object is another variant.
    pub fn get_as<T: EntityKind>(&self, id: &Identifier) -> StoreResult<&T> {
        let entity = self.get(id)?;
        let found = entity.isa();
        T::from_entity(entity).ok_or_else(|| StoreError::WrongKind {
            reference: id.clone(),
            expected: T::ISA,
            found,
        })
    }

    pub fn get_as_mut<T: EntityKind>(&mut self, id: &Identifier) -> StoreResult<&mut T> {
        let entity = self.get_mut(id)?;
        let found = entity.isa();
        T::from_entity_mut(entity).ok_or_else(|| StoreError::WrongKind {
            reference: id.clone(),
            expected: T::ISA,
            found,
        })
    }

    /// Remove an object. References to it elsewhere are left in place.
    pub fn remove(&mut self, id: &Identifier) -> Option<Entity> {
        let removed = self.objects.remove(id);
        if removed.is_some() {
            debug!(id = %id, "removed object");
        }
        removed
    }

    /// All objects, sorted by `isa` tag and then identifier.
    pub fn entities_in_order(&self) -> Vec<&Entity> {
        let mut entities: Vec<&Entity> = self.objects.values().collect();
        entities.sort_by(|a, b| {
            a.isa()
                .cmp(&b.isa())
                .then_with(|| a.reference().cmp(b.reference()))
        });
        entities
    }

    /// Objects of one kind, sorted by identifier.
    pub fn entities_of_kind(&self, isa: Isa) -> Vec<&Entity> {
        let mut entities: Vec<&Entity> =
            self.objects.values().filter(|e| e.isa() == isa).collect();
        entities.sort_by(|a, b| a.reference().cmp(b.reference()));
        entities
    }

    /// Typed objects of one kind, sorted by identifier.
    pub fn of_kind<T: EntityKind>(&self) -> Vec<&T> {
        self.entities_of_kind(T::ISA)
            .into_iter()
            .filter_map(T::from_entity)
            .collect()
    }

    /// Resolve identifiers in order. Fails on the first one not stored.
    pub fn resolve(&self, ids: &[Identifier]) -> StoreResult<Vec<&Entity>> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Every `(owner, missing)` pair where `owner` references an identifier
    /// that is not stored, in deterministic order.
    pub fn dangling_references(&self) -> Vec<(Identifier, Identifier)> {
        let mut dangling = Vec::new();
        for entity in self.entities_in_order() {
            for reference in entity.references() {
                if !self.objects.contains_key(reference) {
                    dangling.push((entity.reference().clone(), reference.clone()));
                }
            }
        }
        dangling
    }
}

impl ObjectLookup for ObjectStore {
    fn object(&self, id: &Identifier) -> Option<&Entity> {
        self.objects.get(id)
    }

    fn objects(&self) -> Vec<&Entity> {
        self.objects.values().collect()
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("object_count", &self.objects.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbx_objects::{
        BuildFile, EncodeContext, FileReference, Group, NativeTarget, PbxObject, SourceTree,
        SourcesBuildPhase,
    };

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    fn sample() -> ObjectStore {
        let mut store = ObjectStore::new();
        let mut group = Group::new(id("G1"));
        group.children.push(id("F1"));
        store.insert(group).unwrap();
        store
            .insert(FileReference::new(id("F1"), "main.m", SourceTree::Group))
            .unwrap();
        store.insert(BuildFile::new(id("B1"), id("F1"))).unwrap();
        let mut phase = SourcesBuildPhase::new(id("P1"));
        phase.base.files.push(id("B1"));
        store.insert(phase).unwrap();
        store
    }

    #[test]
    fn insert_and_get() {
        let store = sample();
        assert_eq!(store.len(), 4);
        assert!(store.contains(&id("F1")));
        assert_eq!(store.get(&id("F1")).unwrap().isa(), Isa::FileReference);
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let mut store = sample();
        let err = store.insert(Group::new(id("F1"))).unwrap_err();
        assert_eq!(err, StoreError::DuplicateIdentifier(id("F1")));
        assert_eq!(store.get(&id("F1")).unwrap().isa(), Isa::FileReference);
    }

    #[test]
    fn missing_object_is_not_found() {
        let store = sample();
        assert_eq!(
            store.get(&id("NOPE")).unwrap_err(),
            StoreError::NotFound(id("NOPE"))
        );
        assert!(store.resolve(&[id("F1"), id("NOPE")]).is_err());
    }

    #[test]
    fn insert_new_generates_canonical_identifier() {
        let mut store = ObjectStore::new();
        let new_id = store
            .insert_new(|id| NativeTarget::new(id, "App"))
            .unwrap();
        assert!(new_id.is_canonical());
        let target: &NativeTarget = store.get_as(&new_id).unwrap();
        assert_eq!(target.base.name, "App");
    }

    #[test]
    fn insert_new_rejects_mismatched_reference() {
        let mut store = ObjectStore::new();
        let err = store.insert_new(|_| Group::new(id("OTHER"))).unwrap_err();
        assert!(matches!(err, StoreError::ReferenceMismatch { ref found, .. } if found == &id("OTHER")));
        assert!(store.is_empty());
    }

    #[test]
    fn typed_access_checks_kind() {
        let mut store = sample();
        let err = store.get_as::<Group>(&id("F1")).unwrap_err();
        assert_eq!(
            err,
            StoreError::WrongKind {
                reference: id("F1"),
                expected: Isa::Group,
                found: Isa::FileReference,
            }
        );
        store.get_as_mut::<FileReference>(&id("F1")).unwrap().base.name = Some("Main".into());
        assert_eq!(
            store.get(&id("F1")).unwrap().display_name().as_deref(),
            Some("Main")
        );
    }

    #[test]
    fn entities_in_order_sorts_by_isa_then_identifier() {
        let mut store = sample();
        store.insert(Group::new(id("G0"))).unwrap();
        let order: Vec<(Isa, &str)> = store
            .entities_in_order()
            .iter()
            .map(|e| (e.isa(), e.reference().as_str()))
            .collect();
        assert_eq!(
            order,
            [
                (Isa::BuildFile, "B1"),
                (Isa::FileReference, "F1"),
                (Isa::Group, "G0"),
                (Isa::Group, "G1"),
                (Isa::SourcesBuildPhase, "P1"),
            ]
        );
        assert_eq!(store.of_kind::<Group>().len(), 2);
        assert_eq!(store.entities_of_kind(Isa::BuildFile).len(), 1);
    }

    #[test]
    fn remove_leaves_dangling_references() {
        let mut store = sample();
        assert!(store.dangling_references().is_empty());
        store.remove(&id("F1")).unwrap();
        assert_eq!(
            store.dangling_references(),
            [(id("B1"), id("F1")), (id("G1"), id("F1"))]
        );
        assert!(store.remove(&id("F1")).is_none());
    }

    #[test]
    fn store_resolves_comments_for_encoding() {
        let store = sample();
        let ctx = EncodeContext::new(&store);
        assert_eq!(ctx.comment(&id("B1")), Some("main.m in Sources"));
        let phase: &SourcesBuildPhase = store.get_as(&id("P1")).unwrap();
        let dict = phase.encode(&ctx).unwrap();
        assert_eq!(
            dict.get("files").unwrap().as_array().unwrap()[0].comment(),
            Some("main.m in Sources")
        );
    }
}
