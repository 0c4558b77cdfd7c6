use crate::errors::Result;
use crate::model::DeepnoteFile;
use crate::snapshot::digest::{content_hash, snapshot_hash};
use crate::{log_op_end, log_op_start};

/// Result of splitting a canonical file
#[derive(Debug, Clone, PartialEq)]
pub struct SplitFile {
    /// Outputs, execution counts and timings removed
    pub source: DeepnoteFile,
    /// Full copy with `metadata.snapshotHash` stamped
    pub snapshot: DeepnoteFile,
}

/// Split `file` into a source file and a snapshot file
///
/// Executable blocks get the same `contentHash` on both sides.
/// Non-executable blocks pass through untouched. `environment` and
/// `execution` only survive on the snapshot side.
///
/// # Errors
///
/// Returns `NotebridgeError::Serialization` if the snapshot hash cannot be
/// computed.
pub fn split_file(file: &DeepnoteFile) -> Result<SplitFile> {
    let start = std::time::Instant::now();
    log_op_start!("split_file", project_id = %file.project.id);

    let mut snapshot = file.clone();
    for block in snapshot.blocks_mut() {
        if block.block_type.is_executable() {
            block.content_hash = Some(content_hash(&block.content));
        }
    }

    let mut source = snapshot.clone();
    for block in source.blocks_mut() {
        if block.block_type.is_executable() {
            block.clear_execution_state();
        }
    }
    source.metadata.snapshot_hash = None;
    source.environment = None;
    source.execution = None;

    snapshot.metadata.snapshot_hash = Some(snapshot_hash(&snapshot)?);

    log_op_end!(
        "split_file",
        duration_ms = start.elapsed().as_millis() as u64,
        block_count = snapshot.project.block_count()
    );

    Ok(SplitFile { source, snapshot })
}

/// Check if any executable block carries a non-empty outputs list
pub fn has_outputs(file: &DeepnoteFile) -> bool {
    file.blocks()
        .any(|b| b.block_type.is_executable() && b.has_outputs())
}
