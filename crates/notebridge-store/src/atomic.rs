//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

use crate::errors::{invalid_path, io_error_at, Result};
use std::fs;
use std::path::Path;

/// Atomically write bytes to a file
///
/// The temp file is a hidden sibling of the target, so the rename never
/// crosses filesystems.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let file_name = target_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| invalid_path("atomic_write", target_path, "path has no file name"))?;

    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error_at("create_parent_dir", parent, e))?;
    }

    let temp_path = target_path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp_path, content).map_err(|e| io_error_at("write_temp", &temp_path, e))?;

    if let Err(e) = fs::rename(&temp_path, target_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error_at("rename_temp", target_path, e));
    }

    tracing::debug!(path = %target_path.display(), bytes = content.len(), "wrote file");
    Ok(())
}
