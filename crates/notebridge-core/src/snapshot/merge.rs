use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ConvertConfig;
use crate::errors::{NotebridgeError, Result};
use crate::model::{Block, DeepnoteFile};
use crate::snapshot::digest::content_hash;
use crate::{log_op_end, log_op_error, log_op_start};

/// What to do with outputs recorded for content that has since changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Leave the stale block without outputs
    #[default]
    DropOutputs,
    /// Attach the recorded outputs regardless
    KeepOutputs,
    /// Fail the merge
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub stale_policy: StalePolicy,
}

impl MergeOptions {
    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            stale_policy: config.snapshot.stale_policy,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub file: DeepnoteFile,
    /// Ids of blocks whose content changed since the snapshot was taken
    pub stale_blocks: Vec<String>,
}

/// Reattach snapshot execution state to a source file
///
/// Outputs, execution counts and timings are matched by block id. Blocks
/// missing from the snapshot stay as they are; snapshot blocks missing from
/// the source are ignored.
///
/// # Errors
///
/// Returns `NotebridgeError::StaleSnapshot` for the first stale block when
/// the policy is [`StalePolicy::Reject`].
pub fn merge_snapshot(
    source: &DeepnoteFile,
    snapshot: &DeepnoteFile,
    options: MergeOptions,
) -> Result<MergeOutcome> {
    let start = std::time::Instant::now();
    log_op_start!("merge_snapshot", project_id = %source.project.id);

    let recorded: HashMap<&str, &Block> = snapshot
        .blocks()
        .filter(|b| b.block_type.is_executable())
        .map(|b| (b.id.as_str(), b))
        .collect();

    let mut merged = source.clone();
    let mut stale_blocks = Vec::new();

    for block in merged.blocks_mut() {
        if !block.block_type.is_executable() {
            continue;
        }
        let Some(snap) = recorded.get(block.id.as_str()) else {
            continue;
        };

        let current = content_hash(&block.content);
        let stale = snap
            .content_hash
            .as_deref()
            .is_some_and(|hash| hash != current);

        if stale {
            tracing::debug!(block_id = %block.id, "snapshot block is stale");
            stale_blocks.push(block.id.clone());
            match options.stale_policy {
                StalePolicy::DropOutputs => {
                    block.clear_execution_state();
                    continue;
                }
                StalePolicy::KeepOutputs => {}
                StalePolicy::Reject => {
                    let err = NotebridgeError::StaleSnapshot {
                        block_id: block.id.clone(),
                        recorded: snap.content_hash.clone().unwrap_or_default(),
                        current,
                    };
                    log_op_error!(
                        "merge_snapshot",
                        err.clone(),
                        duration_ms = start.elapsed().as_millis() as u64
                    );
                    return Err(err);
                }
            }
        }

        block.execution_count = snap.execution_count;
        block.outputs = snap.outputs.clone();
        block.execution_started_at = snap.execution_started_at.clone();
        block.execution_finished_at = snap.execution_finished_at.clone();
    }

    merged.environment = snapshot.environment.clone();
    merged.execution = snapshot.execution.clone();
    merged.metadata.snapshot_hash = snapshot.metadata.snapshot_hash.clone();

    log_op_end!(
        "merge_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        stale_count = stale_blocks.len()
    );

    Ok(MergeOutcome {
        file: merged,
        stale_blocks,
    })
}
