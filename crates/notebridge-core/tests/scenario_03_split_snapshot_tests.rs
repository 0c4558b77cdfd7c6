/// Scenario 3: Split a file with outputs into source and snapshot
mod common;

use notebridge_core::model::BlockType;
use notebridge_core::{has_outputs, merge_snapshot, split_file, MergeOptions, StalePolicy};

#[test]
fn test_scenario_03_split_separates_execution_state() {
    // GIVEN a project whose code block has one output
    let file = common::sample_project();
    assert!(has_outputs(&file));

    // WHEN splitting it
    let split = split_file(&file).expect("split should succeed");

    // THEN the source copy has no outputs or execution count
    let source_block = split
        .source
        .blocks()
        .find(|b| b.id == "b-code")
        .expect("code block in source");
    assert!(source_block.outputs.is_none());
    assert!(source_block.execution_count.is_none());

    // AND the snapshot copy keeps both
    let snapshot_block = split
        .snapshot
        .blocks()
        .find(|b| b.id == "b-code")
        .expect("code block in snapshot");
    assert_eq!(snapshot_block.outputs.as_ref().map(Vec::len), Some(1));
    assert_eq!(snapshot_block.execution_count, Some(2));

    // AND both share the same content hash
    assert!(source_block.content_hash.is_some());
    assert_eq!(source_block.content_hash, snapshot_block.content_hash);
}

#[test]
fn test_scenario_03_only_executable_blocks_are_hashed() {
    let split = split_file(&common::sample_project()).unwrap();
    for block in split.snapshot.blocks() {
        assert_eq!(
            block.content_hash.is_some(),
            block.block_type.is_executable(),
            "unexpected hash state for {}",
            block.id
        );
    }
    let title = split.source.blocks().find(|b| b.id == "b-title").unwrap();
    assert_eq!(title.block_type, BlockType::TextCellH1);
    assert!(title.content_hash.is_none());
}

#[test]
fn test_scenario_03_snapshot_hash_only_on_snapshot() {
    let split = split_file(&common::sample_project()).unwrap();
    assert!(split.source.metadata.snapshot_hash.is_none());
    let hash = split.snapshot.metadata.snapshot_hash.as_deref().unwrap();
    assert!(hash.starts_with("sha256:"));
}

#[test]
fn test_scenario_03_split_is_deterministic() {
    let file = common::sample_project();
    let first = split_file(&file).unwrap();
    let second = split_file(&file).unwrap();
    assert_eq!(
        first.snapshot.metadata.snapshot_hash,
        second.snapshot.metadata.snapshot_hash
    );
}

#[test]
fn test_scenario_03_merge_restores_original_execution_state() {
    let file = common::sample_project();
    let split = split_file(&file).unwrap();

    let outcome = merge_snapshot(&split.source, &split.snapshot, MergeOptions::default()).unwrap();

    let merged = outcome.file.blocks().find(|b| b.id == "b-code").unwrap();
    let original = file.blocks().find(|b| b.id == "b-code").unwrap();
    assert_eq!(merged.outputs, original.outputs);
    assert_eq!(merged.execution_count, original.execution_count);
    assert_eq!(merged.execution_started_at, original.execution_started_at);
    assert!(outcome.stale_blocks.is_empty());
}

#[test]
fn test_scenario_03_stale_policies() {
    let split = split_file(&common::sample_project()).unwrap();
    let mut edited = split.source.clone();
    for block in edited.blocks_mut() {
        if block.id == "b-code" {
            block.content = "sales.head()".to_string();
        }
    }

    let dropped = merge_snapshot(&edited, &split.snapshot, MergeOptions::default()).unwrap();
    assert_eq!(dropped.stale_blocks, vec!["b-code".to_string()]);
    assert!(!has_outputs(&dropped.file));

    let kept = merge_snapshot(
        &edited,
        &split.snapshot,
        MergeOptions {
            stale_policy: StalePolicy::KeepOutputs,
        },
    )
    .unwrap();
    assert!(has_outputs(&kept.file));

    let rejected = merge_snapshot(
        &edited,
        &split.snapshot,
        MergeOptions {
            stale_policy: StalePolicy::Reject,
        },
    );
    assert!(rejected.is_err());
}

#[test]
fn test_scenario_03_outputs_on_markdown_do_not_count() {
    // GIVEN a project whose only outputs sit on a markdown block
    let mut file = common::sample_project();
    for block in file.blocks_mut() {
        if block.block_type.is_executable() {
            block.clear_execution_state();
        }
    }
    let notes = file
        .blocks_mut()
        .find(|b| b.id == "b-notes")
        .expect("markdown block");
    notes.outputs = Some(vec![serde_json::json!({"output_type": "stream", "text": "stray"})]);

    // THEN the file is not considered to have outputs
    assert!(!has_outputs(&file));
}

#[test]
fn test_scenario_03_prior_snapshot_hash_is_dropped_from_source() {
    // GIVEN a file that was itself read from a snapshot
    let mut file = common::sample_project();
    file.metadata.snapshot_hash = Some("sha256:stale".to_string());

    // WHEN splitting it
    let split = split_file(&file).expect("split should succeed");

    // THEN the source side carries no snapshot hash
    assert!(split.source.metadata.snapshot_hash.is_none());

    // AND the snapshot side gets a freshly computed one
    let expected = notebridge_core::snapshot::snapshot_hash(&split.snapshot).unwrap();
    assert_eq!(split.snapshot.metadata.snapshot_hash, Some(expected));
}
