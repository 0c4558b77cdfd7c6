use notebridge_core::config::ConvertConfig;
use notebridge_core::model::DeepnoteFile;
use notebridge_core::snapshot::{merge_snapshot, MergeOptions, MergeOutcome};
use notebridge_core::{log_op_end, log_op_error, log_op_start, ExError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::naming::SnapshotName;
use crate::errors::{io_error_at, Result};
use crate::files::read_deepnote_file;

/// Where to look for snapshots of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLookup {
    /// Explicit snapshot directory; overrides `dir_name`
    pub snapshot_dir: Option<PathBuf>,
    /// Directory name resolved against the source file's directory
    pub dir_name: String,
}

impl Default for SnapshotLookup {
    fn default() -> Self {
        Self::from_config(&ConvertConfig::default())
    }
}

impl SnapshotLookup {
    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            snapshot_dir: None,
            dir_name: config.snapshot.dir_name.clone(),
        }
    }

    /// Use `dir` regardless of where the source file lives
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Snapshot directory for the given source file
    pub fn directory_for(&self, source_path: &Path) -> PathBuf {
        match &self.snapshot_dir {
            Some(dir) => dir.clone(),
            None => source_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(&self.dir_name),
        }
    }
}

/// Path of the newest snapshot for `project_id`
///
/// A `latest` file wins; otherwise the greatest timestamp. Files that do
/// not follow the naming convention or belong to other projects are ignored.
///
/// # Errors
///
/// Returns `ERR_IO` if the directory exists but cannot be listed.
pub fn find_latest_snapshot(
    source_path: &Path,
    project_id: &str,
    lookup: &SnapshotLookup,
) -> Result<Option<PathBuf>> {
    let dir = lookup.directory_for(source_path);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "no snapshot directory");
            return Ok(None);
        }
        Err(e) => return Err(io_error_at("find_latest_snapshot", &dir, e)),
    };

    let mut best: Option<(SnapshotName, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| io_error_at("find_latest_snapshot", &dir, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(SnapshotName::parse) else {
            continue;
        };
        if name.project_id != project_id {
            continue;
        }
        if best.as_ref().map_or(true, |(b, _)| name.stamp > b.stamp) {
            best = Some((name, entry.path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// Load the newest snapshot for `project_id`, if any
///
/// # Errors
///
/// - `ERR_IO` if the directory or the chosen file cannot be read
/// - `ERR_PARSE_FAILURE` if the chosen file is malformed
pub fn load_latest_snapshot(
    source_path: &Path,
    project_id: &str,
    lookup: &SnapshotLookup,
) -> Result<Option<DeepnoteFile>> {
    match find_latest_snapshot(source_path, project_id, lookup)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading snapshot");
            read_deepnote_file(&path).map(Some)
        }
        None => Ok(None),
    }
}

/// Read a source file and reattach its newest snapshot's outputs
///
/// Without a snapshot the source comes back unchanged.
///
/// # Errors
///
/// - Any read or parse failure of the source or snapshot file
/// - `ERR_STALE_SNAPSHOT` if a block changed and the policy rejects stale
///   snapshots
pub fn load_merged(
    source_path: &Path,
    options: MergeOptions,
    lookup: &SnapshotLookup,
) -> Result<MergeOutcome> {
    let start = std::time::Instant::now();
    log_op_start!("load_merged", path = %source_path.display());

    let source = read_deepnote_file(source_path)?;
    let Some(snapshot) = load_latest_snapshot(source_path, &source.project.id, lookup)? else {
        log_op_end!(
            "load_merged",
            duration_ms = start.elapsed().as_millis() as u64,
            snapshot_found = false
        );
        return Ok(MergeOutcome {
            file: source,
            stale_blocks: Vec::new(),
        });
    };

    let outcome = merge_snapshot(&source, &snapshot, options).map_err(|e| {
        let err = ExError::from(e).with_path(source_path.display().to_string());
        log_op_error!(
            "load_merged",
            err.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        err
    })?;

    log_op_end!(
        "load_merged",
        duration_ms = start.elapsed().as_millis() as u64,
        snapshot_found = true,
        stale_count = outcome.stale_blocks.len()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_beside_source() {
        let lookup = SnapshotLookup::default();
        assert_eq!(
            lookup.directory_for(Path::new("/work/sales.deepnote")),
            PathBuf::from("/work/snapshots")
        );
    }

    #[test]
    fn test_explicit_directory_wins() {
        let lookup = SnapshotLookup::default().in_dir("/var/snaps");
        assert_eq!(
            lookup.directory_for(Path::new("/work/sales.deepnote")),
            PathBuf::from("/var/snaps")
        );
    }

    #[test]
    fn test_configured_dir_name() {
        let mut config = ConvertConfig::default();
        config.snapshot.dir_name = ".runs".to_string();
        let lookup = SnapshotLookup::from_config(&config);
        assert_eq!(
            lookup.directory_for(Path::new("sales.deepnote")),
            PathBuf::from(".runs")
        );
    }
}
