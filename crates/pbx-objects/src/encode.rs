//! Encoding objects back into plist dictionaries.
//!
//! Encoding needs two things from the surrounding graph: whether each
//! referenced identifier exists, and the comment to print next to it. Both
//! are precomputed once per write into an [`EncodeContext`], so comments are
//! always derived from the current graph and never from stale input.

use std::collections::{HashMap, HashSet};

use pbx_types::{CommentedString, Identifier, PlistDict, PlistValue};
use tracing::debug;

use crate::entity::{Entity, Isa};
use crate::error::{ObjectError, ObjectResult};

/// Read access to the objects of a graph, implemented by the object store.
pub trait ObjectLookup {
    /// Resolve one identifier.
    fn object(&self, id: &Identifier) -> Option<&Entity>;

    /// Every object, in any order.
    fn objects(&self) -> Vec<&Entity>;
}

/// Comments and existence information for one serialization pass.
#[derive(Debug, Clone)]
pub struct EncodeContext {
    comments: HashMap<Identifier, Option<String>>,
    validate: bool,
}

impl EncodeContext {
    /// Precompute comments for every object visible through `lookup`.
    pub fn new(lookup: &dyn ObjectLookup) -> Self {
        let mut objects = lookup.objects();
        // First phase or owner in (isa, identifier) order names a shared object.
        objects.sort_by(|a, b| {
            a.isa()
                .cmp(&b.isa())
                .then_with(|| a.reference().cmp(b.reference()))
        });
        let mut comments: HashMap<Identifier, Option<String>> = objects
            .iter()
            .map(|e| (e.reference().clone(), e.display_name()))
            .collect();

        // Build files are named after their file and the phase that lists them.
        let mut phase_of: HashMap<&Identifier, Option<String>> = HashMap::new();
        for entity in &objects {
            if let Some(phase) = entity.build_phase() {
                for file in &phase.files {
                    phase_of.entry(file).or_insert_with(|| entity.display_name());
                }
            }
        }
        for entity in &objects {
            if let Entity::BuildFile(build_file) = entity {
                let file = build_file
                    .file_ref
                    .as_ref()
                    .and_then(|r| comments.get(r).cloned().flatten());
                let phase = phase_of.get(&build_file.reference).cloned().flatten();
                comments.insert(build_file.reference.clone(), build_file_comment(file, phase));
            }
        }

        // Configuration lists are named after their owner.
        let mut named_lists: HashSet<&Identifier> = HashSet::new();
        for entity in &objects {
            let Some(list) = entity.build_configuration_list() else {
                continue;
            };
            if !comments.contains_key(list) || !named_lists.insert(list) {
                continue;
            }
            let owner_name = match entity {
                Entity::Project(project) => project.name.clone(),
                other => other.display_name().unwrap_or_default(),
            };
            comments.insert(
                list.clone(),
                Some(format!(
                    "Build configuration list for {} \"{}\"",
                    entity.isa(),
                    owner_name
                )),
            );
        }

        debug!(objects = comments.len(), "built encode context");
        Self {
            comments,
            validate: true,
        }
    }

    /// Disable dangling-reference checks; unresolved references are written
    /// without a comment instead of failing.
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Whether `id` names an object in the graph.
    pub fn contains(&self, id: &Identifier) -> bool {
        self.comments.contains_key(id)
    }

    /// The comment printed next to references to `id`.
    pub fn comment(&self, id: &Identifier) -> Option<&str> {
        self.comments.get(id).and_then(|c| c.as_deref())
    }

    /// A commented reference from `owner` to `id`.
    pub fn reference(&self, owner: &Identifier, id: &Identifier) -> ObjectResult<CommentedString> {
        match self.comments.get(id) {
            Some(comment) => Ok(CommentedString::with_optional_comment(
                id.as_str(),
                comment.clone(),
            )),
            None if !self.validate => Ok(CommentedString::new(id.as_str())),
            None => Err(ObjectError::DanglingReference {
                owner: owner.clone(),
                reference: id.clone(),
            }),
        }
    }
}

fn build_file_comment(file: Option<String>, phase: Option<String>) -> Option<String> {
    match (file, phase) {
        (Some(file), Some(phase)) => Some(format!("{file} in {phase}")),
        (Some(file), None) => Some(file),
        (None, Some(phase)) => Some(format!("(null) in {phase}")),
        (None, None) => None,
    }
}

/// Builder for one object's dictionary.
///
/// `isa` is inserted first. [`finish`](Self::finish) puts the remaining keys
/// in ascending byte order, which is the order Xcode writes them in and the
/// documented field order for every variant.
pub struct ObjectEncoder<'a> {
    ctx: &'a EncodeContext,
    owner: &'a Identifier,
    dict: PlistDict,
}

impl<'a> ObjectEncoder<'a> {
    pub fn new(ctx: &'a EncodeContext, owner: &'a Identifier, isa: Isa) -> Self {
        let mut dict = PlistDict::new();
        dict.insert("isa", isa.as_str());
        Self { ctx, owner, dict }
    }

    pub fn string(&mut self, key: &str, value: impl Into<String>) {
        self.dict.insert(key, PlistValue::String(value.into()));
    }

    pub fn opt_string(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.string(key, value);
        }
    }

    pub fn legacy_bool(&mut self, key: &str, value: bool) {
        self.dict.insert(key, PlistValue::legacy_bool(value));
    }

    pub fn strings(&mut self, key: &str, values: &[String]) {
        let items = values.iter().map(|v| PlistValue::from(v.as_str())).collect();
        self.dict.insert(key, PlistValue::Array(items));
    }

    pub fn value(&mut self, key: &str, value: impl Into<PlistValue>) {
        self.dict.insert(key, value.into());
    }

    pub fn reference(&mut self, key: &str, id: &Identifier) -> ObjectResult<()> {
        let value = self.ctx.reference(self.owner, id)?;
        self.dict.insert(key, PlistValue::Commented(value));
        Ok(())
    }

    pub fn opt_reference(&mut self, key: &str, id: Option<&Identifier>) -> ObjectResult<()> {
        match id {
            Some(id) => self.reference(key, id),
            None => Ok(()),
        }
    }

    pub fn references(&mut self, key: &str, ids: &[Identifier]) -> ObjectResult<()> {
        let items = ids
            .iter()
            .map(|id| self.ctx.reference(self.owner, id).map(PlistValue::Commented))
            .collect::<ObjectResult<Vec<_>>>()?;
        self.dict.insert(key, PlistValue::Array(items));
        Ok(())
    }

    /// A commented reference for use inside nested values.
    pub fn commented_reference(&self, id: &Identifier) -> ObjectResult<PlistValue> {
        self.ctx
            .reference(self.owner, id)
            .map(PlistValue::Commented)
    }

    /// The finished dictionary in canonical key order.
    pub fn finish(mut self) -> PlistDict {
        self.dict.sort_keys_by(|a, b| match (a == "isa", b == "isa") {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.cmp(b),
        });
        self.dict
    }
}
