//! Canonical and Jupyter file IO
//!
//! Thin wrappers pairing the core codecs with atomic writes.

use notebridge_core::convert::{parse_jupyter_str, to_jupyter_string, ExportedNotebook, NamedNotebook};
use notebridge_core::model::{DeepnoteFile, JupyterNotebook};
use std::fs;
use std::path::{Path, PathBuf};

use crate::atomic::atomic_write;
use crate::errors::{invalid_path, io_error_at, parse_failure, serialization_failure, Result};

fn read_text(operation: &str, path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| io_error_at(operation, path, e))?;
    tracing::debug!(op = operation, path = %path.display(), bytes = content.len(), "read file");
    Ok(content)
}

/// Read and parse a canonical `.deepnote` file
///
/// # Errors
///
/// - `ERR_IO` if the file cannot be read
/// - `ERR_PARSE_FAILURE` if the YAML does not match the canonical schema
pub fn read_deepnote_file(path: &Path) -> Result<DeepnoteFile> {
    let content = read_text("read_deepnote_file", path)?;
    DeepnoteFile::from_yaml_str(&content)
        .map_err(|e| parse_failure("read_deepnote_file", path, e))
}

/// Serialize and atomically write a canonical `.deepnote` file
///
/// # Errors
///
/// - `ERR_SERIALIZATION` if a value cannot be encoded
/// - `ERR_IO` if the file cannot be written
pub fn write_deepnote_file(path: &Path, file: &DeepnoteFile) -> Result<()> {
    let content = file
        .to_yaml_string()
        .map_err(|e| serialization_failure("write_deepnote_file", path, e))?;
    atomic_write(path, content.as_bytes())
}

/// Read a Jupyter notebook, named after its file name
///
/// # Errors
///
/// - `ERR_INVALID_INPUT` if the path has no UTF-8 file name
/// - `ERR_IO` if the file cannot be read
/// - `ERR_PARSE_FAILURE` if the JSON is not a notebook
pub fn read_jupyter_file(path: &Path) -> Result<NamedNotebook> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| invalid_path("read_jupyter_file", path, "path has no file name"))?;
    let content = read_text("read_jupyter_file", path)?;
    let notebook =
        parse_jupyter_str(&content).map_err(|e| parse_failure("read_jupyter_file", path, e))?;
    Ok(NamedNotebook::new(name, notebook))
}

/// Atomically write a Jupyter notebook
///
/// # Errors
///
/// - `ERR_SERIALIZATION` if the notebook cannot be encoded
/// - `ERR_IO` if the file cannot be written
pub fn write_jupyter_file(path: &Path, notebook: &JupyterNotebook) -> Result<()> {
    let content = to_jupyter_string(notebook)
        .map_err(|e| serialization_failure("write_jupyter_file", path, e))?;
    atomic_write(path, content.as_bytes())
}

/// Write every exported notebook into `dir` under its export file name
///
/// Returns the written paths in export order.
///
/// # Errors
///
/// Fails on the first notebook that cannot be written.
pub fn write_exported_notebooks(dir: &Path, exported: &[ExportedNotebook]) -> Result<Vec<PathBuf>> {
    exported
        .iter()
        .map(|e| {
            let path = dir.join(&e.file_name);
            write_jupyter_file(&path, &e.notebook)?;
            Ok(path)
        })
        .collect()
}
