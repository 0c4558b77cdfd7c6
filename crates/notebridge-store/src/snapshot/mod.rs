//! Snapshot directory convention
//!
//! Snapshots live beside their source file in a directory (default
//! `snapshots/`) as `{slug}_{projectId}_{timestamp|latest}.snapshot.deepnote`.

pub mod load;
pub mod naming;
pub mod write;

pub use load::{find_latest_snapshot, load_latest_snapshot, load_merged, SnapshotLookup};
pub use naming::{snapshot_file_name, SnapshotName, SnapshotStamp, SNAPSHOT_SUFFIX};
pub use write::{save_split, write_snapshot, write_snapshot_at, SavedSplit, SnapshotWriteMode};
