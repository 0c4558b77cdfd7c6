//! Block↔cell mapping for Jupyter documents.

use serde_json::{Map, Value};
use std::time::Instant;

use super::metadata::{self as keys, is_reserved_key, stamp_extra, stamp_propagated, PropagatedLookup};
use super::{file_stem, unique_file_names};
use crate::codegen::{placeholder_source, BlockSourceGenerator, DefaultSourceGenerator};
use crate::config::ConvertConfig;
use crate::errors::{NotebridgeError, Result};
use crate::ids::{IdGenerator, UuidIdGenerator};
use crate::model::{
    Block, BlockType, CellType, DeepnoteFile, FileMetadata, JupyterCell, JupyterNotebook,
    Metadata, Notebook, Project, FILE_VERSION,
};
use crate::model::file::now_rfc3339;
use crate::sorting::sorting_key_for;
use crate::{log_block_fallback, log_op_end, log_op_start};

const UNTITLED_PROJECT: &str = "Untitled project";

static DEFAULT_GENERATOR: DefaultSourceGenerator = DefaultSourceGenerator;
static DEFAULT_IDS: UuidIdGenerator = UuidIdGenerator;

/// Export collaborators
#[derive(Clone, Copy)]
pub struct ExportOptions<'a> {
    pub generator: &'a dyn BlockSourceGenerator,
}

impl Default for ExportOptions<'static> {
    fn default() -> Self {
        Self {
            generator: &DEFAULT_GENERATOR,
        }
    }
}

/// Import settings and collaborators
#[derive(Clone)]
pub struct ImportOptions<'a> {
    /// Takes precedence over any propagated project name
    pub project_name: Option<String>,
    pub ids: &'a dyn IdGenerator,
}

impl Default for ImportOptions<'static> {
    fn default() -> Self {
        Self {
            project_name: None,
            ids: &DEFAULT_IDS,
        }
    }
}

impl<'a> ImportOptions<'a> {
    /// Options using `ids` to mint identifiers
    pub fn with_ids(ids: &'a dyn IdGenerator) -> Self {
        Self {
            project_name: None,
            ids,
        }
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Apply `[import]` settings from `config`
    pub fn configured(mut self, config: &ConvertConfig) -> Self {
        if self.project_name.is_none() {
            self.project_name = config.import.default_project_name.clone();
        }
        self
    }
}

/// A Jupyter document together with the file name it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct NamedNotebook {
    pub name: String,
    pub notebook: JupyterNotebook,
}

impl NamedNotebook {
    pub fn new(name: impl Into<String>, notebook: JupyterNotebook) -> Self {
        Self {
            name: name.into(),
            notebook,
        }
    }
}

/// One exported Jupyter document
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedNotebook {
    /// `<notebook name>.ipynb`, unique within one export
    pub file_name: String,
    pub notebook_id: String,
    pub notebook: JupyterNotebook,
}

/// Parse a Jupyter document
///
/// # Errors
///
/// Returns `NotebridgeError::Parse` if `content` is not a valid nbformat 4
/// JSON document.
pub fn parse_jupyter_str(content: &str) -> Result<JupyterNotebook> {
    serde_json::from_str(content).map_err(|e| NotebridgeError::parse("jupyter", e.to_string()))
}

/// Serialize a Jupyter document as indented JSON with a trailing newline
///
/// # Errors
///
/// Returns `NotebridgeError::Serialization` if a value cannot be encoded.
pub fn to_jupyter_string(notebook: &JupyterNotebook) -> Result<String> {
    let mut text = serde_json::to_string_pretty(notebook)?;
    text.push('\n');
    Ok(text)
}

/// Convert every notebook of `file` into a Jupyter document
///
/// Blocks are emitted in sorting-key order. A block whose source cannot be
/// generated becomes an inert comment cell; its siblings are unaffected.
///
/// # Errors
///
/// Returns `NotebridgeError::Serialization` if project settings cannot be
/// encoded.
pub fn export_jupyter(file: &DeepnoteFile, options: &ExportOptions<'_>) -> Result<Vec<ExportedNotebook>> {
    let start = Instant::now();
    log_op_start!(
        "export_jupyter",
        project_id = %file.project.id,
        notebook_count = file.project.notebooks.len()
    );

    let names: Vec<&str> = file.project.notebooks.iter().map(|n| n.name.as_str()).collect();
    let file_names = unique_file_names(&names, "ipynb");

    let mut exported = Vec::with_capacity(file.project.notebooks.len());
    for (notebook, file_name) in file.project.notebooks.iter().zip(file_names) {
        let mut document = JupyterNotebook::new();
        stamp_propagated(&mut document.metadata, file, notebook)?;

        for block in notebook.sorted_blocks() {
            document
                .cells
                .push(block_to_cell(block, file, notebook, options.generator)?);
        }

        exported.push(ExportedNotebook {
            file_name,
            notebook_id: notebook.id.clone(),
            notebook: document,
        });
    }

    log_op_end!(
        "export_jupyter",
        duration_ms = start.elapsed().as_millis() as u64,
        block_count = file.project.block_count()
    );

    Ok(exported)
}

fn block_to_cell(
    block: &Block,
    file: &DeepnoteFile,
    notebook: &Notebook,
    generator: &dyn BlockSourceGenerator,
) -> Result<JupyterCell> {
    let mut metadata: Map<String, Value> = block
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    metadata.insert(keys::CELL_ID.into(), Value::from(block.id.as_str()));
    metadata.insert(keys::CELL_TYPE.into(), Value::from(block.block_type.as_str()));
    metadata.insert(keys::BLOCK_GROUP.into(), Value::from(block.block_group.as_str()));
    metadata.insert(keys::SORTING_KEY.into(), Value::from(block.sorting_key.as_str()));
    metadata.insert(keys::SOURCE.into(), Value::from(block.content.as_str()));
    if let Some(version) = block.version {
        metadata.insert(keys::BLOCK_VERSION.into(), Value::from(version));
    }
    if let Some(ts) = &block.execution_started_at {
        metadata.insert(keys::EXECUTION_STARTED_AT.into(), Value::from(ts.as_str()));
    }
    if let Some(ts) = &block.execution_finished_at {
        metadata.insert(keys::EXECUTION_FINISHED_AT.into(), Value::from(ts.as_str()));
    }
    stamp_extra(&mut metadata, keys::BLOCK_EXTRA, &block.extra);
    stamp_propagated(&mut metadata, file, notebook)?;

    let mut cell = match block.block_type.cell_type() {
        CellType::Code => {
            let source = if block.block_type == BlockType::Code {
                block.content.clone()
            } else {
                generator.source_code_for(block).unwrap_or_else(|err| {
                    log_block_fallback!(
                        "export_jupyter",
                        block,
                        err,
                        "source generation failed, emitting placeholder"
                    );
                    placeholder_source(block, &err.to_string())
                })
            };
            let mut cell = JupyterCell::code(&source);
            cell.execution_count = Some(block.execution_count);
            cell.outputs = Some(block.outputs.clone().unwrap_or_default());
            cell
        }
        CellType::Markdown | CellType::Raw => {
            let text = if block.block_type == BlockType::Markdown {
                block.content.clone()
            } else {
                generator.markdown_for(block).unwrap_or_else(|err| {
                    log_block_fallback!(
                        "export_jupyter",
                        block,
                        err,
                        "markdown generation failed, using raw content"
                    );
                    block.content.clone()
                })
            };
            JupyterCell::markdown(&text)
        }
    };

    cell.id = Some(block.id.clone());
    cell.metadata = metadata;
    Ok(cell)
}

/// Build a canonical file from Jupyter documents, one notebook per document
///
/// Identity comes from propagated metadata where present; anything missing is
/// minted through `options.ids`.
///
/// # Errors
///
/// Returns `NotebridgeError::IndexOutOfRange` if a document holds more cells
/// than the sorting-key space can order.
pub fn import_jupyter(documents: &[NamedNotebook], options: &ImportOptions<'_>) -> Result<DeepnoteFile> {
    let start = Instant::now();
    log_op_start!("import_jupyter", notebook_count = documents.len());

    let project_sources: Vec<&Map<String, Value>> = documents
        .iter()
        .flat_map(|d| d.notebook.cells.iter().map(|c| &c.metadata))
        .chain(documents.iter().map(|d| &d.notebook.metadata))
        .collect();
    let propagated = PropagatedLookup::new(project_sources);

    let project_id = propagated
        .string(keys::PROJECT_ID)
        .unwrap_or_else(|| options.ids.unique_id());
    let project_name = options
        .project_name
        .clone()
        .or_else(|| propagated.string(keys::PROJECT_NAME))
        .or_else(|| documents.first().map(|d| file_stem(&d.name)))
        .unwrap_or_else(|| UNTITLED_PROJECT.to_string());

    let mut project = Project::new(project_id, project_name);
    project.integrations = propagated.integrations().unwrap_or_default();
    if let Some(settings) = propagated.settings() {
        project.settings = settings;
    }
    project.init_notebook_id = propagated.string(keys::PROJECT_INIT_NOTEBOOK_ID);
    project.extra = propagated.object(keys::PROJECT_EXTRA).unwrap_or_default();

    for document in documents {
        project.notebooks.push(import_notebook(document, options)?);
    }

    let created_at = propagated
        .string(keys::FILE_CREATED_AT)
        .unwrap_or_else(now_rfc3339);
    let mut metadata = FileMetadata::created(created_at);
    if let Some(modified) = propagated.string(keys::FILE_MODIFIED_AT) {
        metadata.modified_at = Some(modified);
    }
    metadata.exported_at = propagated.string(keys::FILE_EXPORTED_AT);
    metadata.checksum = propagated.string(keys::FILE_CHECKSUM);
    metadata.extra = propagated.object(keys::FILE_METADATA_EXTRA).unwrap_or_default();

    let file = DeepnoteFile {
        version: propagated
            .string(keys::FILE_VERSION)
            .unwrap_or_else(|| FILE_VERSION.to_string()),
        metadata,
        environment: None,
        execution: None,
        project,
        extra: propagated.object(keys::FILE_EXTRA).unwrap_or_default(),
    };

    log_op_end!(
        "import_jupyter",
        duration_ms = start.elapsed().as_millis() as u64,
        project_id = %file.project.id,
        block_count = file.project.block_count()
    );

    Ok(file)
}

fn import_notebook(document: &NamedNotebook, options: &ImportOptions<'_>) -> Result<Notebook> {
    let sources: Vec<&Map<String, Value>> = document
        .notebook
        .cells
        .iter()
        .map(|c| &c.metadata)
        .chain(std::iter::once(&document.notebook.metadata))
        .collect();
    let propagated = PropagatedLookup::new(sources);

    let mut notebook = Notebook::new(
        propagated
            .string(keys::NOTEBOOK_ID)
            .unwrap_or_else(|| options.ids.unique_id()),
        propagated
            .string(keys::NOTEBOOK_NAME)
            .unwrap_or_else(|| file_stem(&document.name)),
    );
    notebook.execution_mode = propagated.execution_mode().unwrap_or_default();
    notebook.is_module = propagated.bool(keys::IS_MODULE).unwrap_or(false);
    notebook.working_directory = propagated.string(keys::WORKING_DIRECTORY);
    notebook.extra = propagated.object(keys::NOTEBOOK_EXTRA).unwrap_or_default();

    for (index, cell) in document.notebook.cells.iter().enumerate() {
        notebook.blocks.push(cell_to_block(index as u64, cell, options)?);
    }

    Ok(notebook)
}

fn cell_to_block(index: u64, cell: &JupyterCell, options: &ImportOptions<'_>) -> Result<Block> {
    let meta = &cell.metadata;
    let reserved = |key: &str| meta.get(key).and_then(Value::as_str).map(str::to_string);

    let id = reserved(keys::CELL_ID).unwrap_or_else(|| options.ids.unique_id());
    let block_group = reserved(keys::BLOCK_GROUP).unwrap_or_else(|| options.ids.unique_id());
    let sorting_key = match reserved(keys::SORTING_KEY) {
        Some(key) => key,
        None => sorting_key_for(index)?,
    };
    let block_type = match reserved(keys::CELL_TYPE) {
        Some(name) => BlockType::from(name),
        None if cell.cell_type == CellType::Code => BlockType::Code,
        None => BlockType::Markdown,
    };
    let content = reserved(keys::SOURCE).unwrap_or_else(|| cell.source.to_text());

    let mut block = Block::new(id, block_type, content, block_group, sorting_key);
    block.metadata = meta
        .iter()
        .filter(|(k, _)| !is_reserved_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<Metadata>();
    block.version = meta
        .get(keys::BLOCK_VERSION)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok());
    block.execution_started_at = reserved(keys::EXECUTION_STARTED_AT);
    block.execution_finished_at = reserved(keys::EXECUTION_FINISHED_AT);
    block.extra = meta
        .get(keys::BLOCK_EXTRA)
        .and_then(Value::as_object)
        .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    if cell.cell_type == CellType::Code {
        block.execution_count = cell.execution_count.flatten();
        block.outputs = cell.outputs.clone().filter(|o| !o.is_empty());
    }

    Ok(block)
}
