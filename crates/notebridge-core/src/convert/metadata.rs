//! Metadata propagation.
//!
//! External dialects have no project or file level, so export copies the
//! singular project, notebook and file fields onto every cell (and onto the
//! document). Import reads each field back from the first place that has it,
//! which keeps a project reconstructible from any subset of its cells.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::errors::Result;
use crate::model::{DeepnoteFile, ExecutionMode, Metadata, Notebook};

// Block back-references
pub const CELL_ID: &str = "cell_id";
pub const CELL_TYPE: &str = "deepnote_cell_type";
pub const BLOCK_GROUP: &str = "deepnote_block_group";
pub const SORTING_KEY: &str = "deepnote_sorting_key";
pub const SOURCE: &str = "deepnote_source";
pub const BLOCK_VERSION: &str = "deepnote_block_version";
pub const EXECUTION_STARTED_AT: &str = "deepnote_execution_started_at";
pub const EXECUTION_FINISHED_AT: &str = "deepnote_execution_finished_at";
/// Unmodelled block fields
pub const BLOCK_EXTRA: &str = "deepnote_block_extra";

// Notebook
pub const NOTEBOOK_ID: &str = "deepnote_notebook_id";
pub const NOTEBOOK_NAME: &str = "deepnote_notebook_name";
pub const EXECUTION_MODE: &str = "deepnote_execution_mode";
pub const IS_MODULE: &str = "deepnote_is_module";
pub const WORKING_DIRECTORY: &str = "deepnote_working_directory";
pub const NOTEBOOK_EXTRA: &str = "deepnote_notebook_extra";

// Project
pub const PROJECT_ID: &str = "deepnote_project_id";
pub const PROJECT_NAME: &str = "deepnote_project_name";
pub const PROJECT_INTEGRATIONS: &str = "deepnote_project_integrations";
pub const PROJECT_SETTINGS: &str = "deepnote_project_settings";
pub const PROJECT_INIT_NOTEBOOK_ID: &str = "deepnote_project_init_notebook_id";
pub const PROJECT_EXTRA: &str = "deepnote_project_extra";

// File
pub const FILE_VERSION: &str = "deepnote_file_version";
pub const FILE_CREATED_AT: &str = "deepnote_file_created_at";
pub const FILE_MODIFIED_AT: &str = "deepnote_file_modified_at";
pub const FILE_EXPORTED_AT: &str = "deepnote_file_exported_at";
pub const FILE_CHECKSUM: &str = "deepnote_file_checksum";
pub const FILE_EXTRA: &str = "deepnote_file_extra";
pub const FILE_METADATA_EXTRA: &str = "deepnote_file_metadata_extra";

const RESERVED_KEYS: [&str; 28] = [
    CELL_ID,
    CELL_TYPE,
    BLOCK_GROUP,
    SORTING_KEY,
    SOURCE,
    BLOCK_VERSION,
    EXECUTION_STARTED_AT,
    EXECUTION_FINISHED_AT,
    BLOCK_EXTRA,
    NOTEBOOK_ID,
    NOTEBOOK_NAME,
    EXECUTION_MODE,
    IS_MODULE,
    WORKING_DIRECTORY,
    NOTEBOOK_EXTRA,
    PROJECT_ID,
    PROJECT_NAME,
    PROJECT_INTEGRATIONS,
    PROJECT_SETTINGS,
    PROJECT_INIT_NOTEBOOK_ID,
    PROJECT_EXTRA,
    FILE_VERSION,
    FILE_CREATED_AT,
    FILE_MODIFIED_AT,
    FILE_EXPORTED_AT,
    FILE_CHECKSUM,
    FILE_EXTRA,
    FILE_METADATA_EXTRA,
];

/// Insert `extra` under `key` as an object, unless it is empty
pub fn stamp_extra(target: &mut Map<String, Value>, key: &str, extra: &BTreeMap<String, Value>) {
    if !extra.is_empty() {
        let object: Map<String, Value> = extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        target.insert(key.into(), Value::Object(object));
    }
}

/// Whether `key` is written by the converter rather than by the block
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Copy notebook, project and file fields onto `target`
///
/// Optional fields that are unset are left out rather than written as null.
///
/// # Errors
///
/// Returns `NotebridgeError::Serialization` if project settings cannot be
/// encoded.
pub fn stamp_propagated(
    target: &mut Map<String, Value>,
    file: &DeepnoteFile,
    notebook: &Notebook,
) -> Result<()> {
    let project = &file.project;

    target.insert(NOTEBOOK_ID.into(), Value::from(notebook.id.as_str()));
    target.insert(NOTEBOOK_NAME.into(), Value::from(notebook.name.as_str()));
    target.insert(
        EXECUTION_MODE.into(),
        Value::from(notebook.execution_mode.as_str()),
    );
    target.insert(IS_MODULE.into(), Value::Bool(notebook.is_module));
    if let Some(dir) = &notebook.working_directory {
        target.insert(WORKING_DIRECTORY.into(), Value::from(dir.as_str()));
    }
    stamp_extra(target, NOTEBOOK_EXTRA, &notebook.extra);

    target.insert(PROJECT_ID.into(), Value::from(project.id.as_str()));
    target.insert(PROJECT_NAME.into(), Value::from(project.name.as_str()));
    target.insert(
        PROJECT_INTEGRATIONS.into(),
        Value::Array(project.integrations.clone()),
    );
    target.insert(
        PROJECT_SETTINGS.into(),
        serde_json::to_value(&project.settings)?,
    );
    if let Some(init) = &project.init_notebook_id {
        target.insert(PROJECT_INIT_NOTEBOOK_ID.into(), Value::from(init.as_str()));
    }
    stamp_extra(target, PROJECT_EXTRA, &project.extra);

    let meta = &file.metadata;
    target.insert(FILE_VERSION.into(), Value::from(file.version.as_str()));
    target.insert(FILE_CREATED_AT.into(), Value::from(meta.created_at.as_str()));
    let optional = [
        (FILE_MODIFIED_AT, &meta.modified_at),
        (FILE_EXPORTED_AT, &meta.exported_at),
        (FILE_CHECKSUM, &meta.checksum),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            target.insert(key.into(), Value::from(value.as_str()));
        }
    }
    stamp_extra(target, FILE_EXTRA, &file.extra);
    stamp_extra(target, FILE_METADATA_EXTRA, &meta.extra);

    Ok(())
}

/// First-wins lookup over an ordered list of metadata maps
pub struct PropagatedLookup<'a> {
    sources: Vec<&'a Map<String, Value>>,
}

impl<'a> PropagatedLookup<'a> {
    pub fn new(sources: Vec<&'a Map<String, Value>>) -> Self {
        Self { sources }
    }

    /// First value for `key`, ignoring nulls
    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.sources
            .iter()
            .filter_map(|m| m.get(key))
            .find(|v| !v.is_null())
    }

    /// First string value for `key`
    pub fn string(&self, key: &str) -> Option<String> {
        self.sources
            .iter()
            .filter_map(|m| m.get(key).and_then(Value::as_str))
            .next()
            .map(str::to_string)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.sources
            .iter()
            .filter_map(|m| m.get(key).and_then(Value::as_bool))
            .next()
    }

    pub fn execution_mode(&self) -> Option<ExecutionMode> {
        self.sources
            .iter()
            .filter_map(|m| m.get(EXECUTION_MODE).and_then(Value::as_str))
            .find_map(ExecutionMode::parse)
    }

    pub fn integrations(&self) -> Option<Vec<Value>> {
        self.sources
            .iter()
            .filter_map(|m| m.get(PROJECT_INTEGRATIONS).and_then(Value::as_array))
            .next()
            .cloned()
    }

    /// First object value for `key`, as an ordered map
    pub fn object(&self, key: &str) -> Option<BTreeMap<String, Value>> {
        self.sources
            .iter()
            .filter_map(|m| m.get(key).and_then(Value::as_object))
            .next()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn settings(&self) -> Option<Metadata> {
        self.sources
            .iter()
            .filter_map(|m| m.get(PROJECT_SETTINGS).and_then(Value::as_object))
            .next()
            .map(|map| Metadata::from(map.clone()))
    }
}
