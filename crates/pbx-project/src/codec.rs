//! Whole-file codec: text to [`ProjectGraph`] and back.
//!
//! Parsing runs the plist parser over the complete buffer, then decodes every
//! entry of the `objects` table into the store. Serializing walks the store
//! in `(isa, identifier)` order and writes Xcode's sectioned layout, with all
//! reference comments regenerated from the current graph.

use pbx_objects::{EncodeContext, Entity, Isa, ObjectError, Project};
use pbx_plist::{PlistWriter, UTF8_HEADER};
use pbx_store::ObjectStore;
use pbx_types::{CommentedString, Identifier, PlistDict, PlistValue, ValueKind};
use tracing::{debug, warn};

use crate::error::{ProjectError, ProjectResult};
use crate::graph::{ProjectGraph, DEFAULT_ARCHIVE_VERSION};
use crate::options::{CodecOptions, UnknownKindPolicy};

const CONFIGURATION_LIST_PREFIX: &str = "Build configuration list for PBXProject \"";

/// Parse a project file with default options.
pub fn parse(bytes: &[u8]) -> ProjectResult<ProjectGraph> {
    parse_with(bytes, &CodecOptions::default())
}

/// Parse a project file.
///
/// Decoding is fail-fast: the first object that cannot be decoded aborts the
/// parse and no graph is returned.
pub fn parse_with(bytes: &[u8], options: &CodecOptions) -> ProjectResult<ProjectGraph> {
    let root = pbx_plist::parse(bytes)?;
    let PlistValue::Dictionary(root) = root else {
        return Err(ProjectError::InvalidHeader(format!(
            "top level is {}, expected dictionary",
            root.kind()
        )));
    };

    let archive_version = match root.get("archiveVersion") {
        Some(value) => header_string(value, "archiveVersion")?,
        None => DEFAULT_ARCHIVE_VERSION.to_string(),
    };
    let object_version = root
        .get("objectVersion")
        .ok_or_else(|| ProjectError::InvalidHeader("missing objectVersion".into()))
        .and_then(|v| header_string(v, "objectVersion"))?;
    let classes = match root.get("classes") {
        Some(value) => value
            .clone()
            .strip_comments()
            .into_dict()
            .map_err(|_| ProjectError::InvalidHeader("classes is not a dictionary".into()))?,
        None => PlistDict::new(),
    };
    let objects = root
        .get("objects")
        .and_then(PlistValue::as_dict)
        .ok_or_else(|| ProjectError::InvalidHeader("missing objects table".into()))?;
    let root_object = root
        .get("rootObject")
        .and_then(PlistValue::as_str)
        .ok_or(ProjectError::MissingRootObject)?;
    let root_object = Identifier::new(root_object).map_err(|_| ProjectError::MissingRootObject)?;

    let store = decode_objects(objects, options)?;
    let mut graph = ProjectGraph::from_parts(
        store,
        archive_version,
        object_version,
        classes,
        root_object.clone(),
        options.clone(),
    );

    // The project name is not stored in the file; recover it from the
    // comment on the project's own configuration list.
    let name = objects
        .get(root_object.as_str())
        .and_then(PlistValue::as_dict)
        .and_then(|project| project.get("buildConfigurationList"))
        .and_then(PlistValue::comment)
        .and_then(project_name_from_comment);
    let project = graph.project_mut()?;
    if let Some(name) = name {
        project.name = name;
    }

    debug!(
        objects = graph.store().len(),
        object_version = graph.object_version(),
        "parsed project"
    );
    Ok(graph)
}

fn header_string(value: &PlistValue, key: &str) -> ProjectResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ProjectError::InvalidHeader(format!("{key} is not a string")))
}

fn project_name_from_comment(comment: &str) -> Option<String> {
    comment
        .strip_prefix(CONFIGURATION_LIST_PREFIX)?
        .strip_suffix('"')
        .map(str::to_string)
}

fn decode_objects(objects: &PlistDict, options: &CodecOptions) -> ProjectResult<ObjectStore> {
    let mut store = ObjectStore::new();
    let mut skipped = 0usize;
    for (key, value) in objects.iter() {
        let reference = Identifier::new(key.value())
            .map_err(|_| ProjectError::InvalidHeader("empty object identifier".into()))?;
        let fields = value.as_dict().ok_or_else(|| ObjectError::TypeMismatch {
            reference: reference.clone(),
            field: "objects".into(),
            expected: ValueKind::Dictionary,
            found: value.kind(),
        })?;
        match Entity::decode(&reference, fields) {
            Ok(entity) => {
                store.insert(entity)?;
            }
            Err(ObjectError::UnknownEntityKind { reference, isa })
                if options.unknown_kinds == UnknownKindPolicy::Skip =>
            {
                warn!(id = %reference, isa = %isa, "skipping object of unknown kind");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
    if skipped > 0 {
        debug!(skipped, "dropped unknown objects");
    }
    Ok(store)
}

/// Serialize with the options carried by the graph.
pub fn serialize(graph: &ProjectGraph) -> ProjectResult<Vec<u8>> {
    serialize_with(graph, graph.options())
}

/// Serialize to canonical project file text.
///
/// Output is a pure function of the graph: the same objects and metadata
/// always produce the same bytes.
pub fn serialize_with(graph: &ProjectGraph, options: &CodecOptions) -> ProjectResult<Vec<u8>> {
    serialize_to_string(graph, options).map(String::into_bytes)
}

/// Serialize to a `String`.
pub fn serialize_to_string(graph: &ProjectGraph, options: &CodecOptions) -> ProjectResult<String> {
    let store = graph.store();
    let mut ctx = EncodeContext::new(store);
    if !options.validate_references {
        ctx = ctx.without_validation();
    }
    // Fails early on a missing or mistyped root.
    store.get_as::<Project>(graph.root_object())?;

    let mut w = PlistWriter::new();
    w.line(UTF8_HEADER);
    w.line("{");
    w.indent();
    w.entry(
        &CommentedString::new("archiveVersion"),
        &PlistValue::from(graph.archive_version()),
    );
    w.entry(
        &CommentedString::new("classes"),
        &PlistValue::Dictionary(graph.classes().clone()),
    );
    w.entry(
        &CommentedString::new("objectVersion"),
        &PlistValue::from(graph.object_version()),
    );

    w.open(&CommentedString::new("objects"));
    let mut section: Option<Isa> = None;
    for entity in store.entities_in_order() {
        let isa = entity.isa();
        if section != Some(isa) {
            if let Some(previous) = section {
                w.line(&format!("/* End {previous} section */"));
            }
            w.line("");
            w.line(&format!("/* Begin {isa} section */"));
            section = Some(isa);
        }
        let key = CommentedString::with_optional_comment(
            entity.reference().as_str(),
            ctx.comment(entity.reference()).map(str::to_string),
        );
        let value = PlistValue::Dictionary(entity.encode(&ctx)?);
        if isa.is_inline() {
            w.inline_entry(&key, &value);
        } else {
            w.entry(&key, &value);
        }
    }
    if let Some(last) = section {
        w.line(&format!("/* End {last} section */"));
    }
    w.close();

    let root = ctx.reference(graph.root_object(), graph.root_object())?;
    w.entry(&CommentedString::new("rootObject"), &PlistValue::Commented(root));
    w.dedent();
    w.line("}");

    debug!(objects = store.len(), "serialized project");
    Ok(w.finish())
}
