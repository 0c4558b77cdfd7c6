use chrono::{DateTime, Utc};
use notebridge_core::model::DeepnoteFile;
use notebridge_core::snapshot::{has_outputs, split_file};
use notebridge_core::{log_op_end, log_op_start};
use std::path::{Path, PathBuf};

use super::load::SnapshotLookup;
use super::naming::{snapshot_file_name, SnapshotStamp};
use crate::atomic::atomic_write;
use crate::errors::{serialization_failure, Result};
use crate::files::write_deepnote_file;

/// Which snapshot copies to write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotWriteMode {
    /// Overwrite the `latest` file only
    #[default]
    Latest,
    /// Add a timestamped file only
    Timestamped,
    /// Write both
    Both,
}

/// Paths produced by [`save_split`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSplit {
    pub source_path: PathBuf,
    /// Empty when the file had no outputs to keep
    pub snapshot_paths: Vec<PathBuf>,
}

/// Write a snapshot into `dir`, stamped with the current time
///
/// # Errors
///
/// Returns `ERR_IO` or `ERR_SERIALIZATION` from the underlying writes.
pub fn write_snapshot(dir: &Path, snapshot: &DeepnoteFile, mode: SnapshotWriteMode) -> Result<Vec<PathBuf>> {
    write_snapshot_at(dir, snapshot, mode, Utc::now())
}

/// Write a snapshot into `dir` as of `time`
///
/// Every copy is written atomically. Returns the written paths, the
/// timestamped copy first.
///
/// # Errors
///
/// Returns `ERR_IO` or `ERR_SERIALIZATION` from the underlying writes.
pub fn write_snapshot_at(
    dir: &Path,
    snapshot: &DeepnoteFile,
    mode: SnapshotWriteMode,
    time: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    let stamps = match mode {
        SnapshotWriteMode::Latest => vec![SnapshotStamp::Latest],
        SnapshotWriteMode::Timestamped => vec![SnapshotStamp::at(time)],
        SnapshotWriteMode::Both => vec![SnapshotStamp::at(time), SnapshotStamp::Latest],
    };

    let content = snapshot
        .to_yaml_string()
        .map_err(|e| serialization_failure("write_snapshot", dir, e))?;

    let mut written = Vec::with_capacity(stamps.len());
    for stamp in &stamps {
        let path = dir.join(snapshot_file_name(
            &snapshot.project.name,
            &snapshot.project.id,
            stamp,
        ));
        atomic_write(&path, content.as_bytes())?;
        written.push(path);
    }
    Ok(written)
}

/// Split `file` and save both halves
///
/// The source half always replaces `source_path`. The snapshot half is
/// written only when some executable block has outputs, so saving a
/// never-run project leaves existing snapshots alone.
///
/// # Errors
///
/// Returns the first split, serialization or IO failure.
pub fn save_split(
    source_path: &Path,
    file: &DeepnoteFile,
    lookup: &SnapshotLookup,
    mode: SnapshotWriteMode,
) -> Result<SavedSplit> {
    let start = std::time::Instant::now();
    log_op_start!("save_split", project_id = %file.project.id);

    let split = split_file(file).map_err(|e| serialization_failure("save_split", source_path, e))?;
    write_deepnote_file(source_path, &split.source)?;

    let snapshot_paths = if has_outputs(file) {
        write_snapshot(&lookup.directory_for(source_path), &split.snapshot, mode)?
    } else {
        Vec::new()
    };

    log_op_end!(
        "save_split",
        duration_ms = start.elapsed().as_millis() as u64,
        snapshot_count = snapshot_paths.len()
    );

    Ok(SavedSplit {
        source_path: source_path.to_path_buf(),
        snapshot_paths,
    })
}
