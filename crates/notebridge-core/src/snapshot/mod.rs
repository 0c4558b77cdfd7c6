//! Snapshot split and merge.
//!
//! A canonical file carries both editable source and regenerable execution
//! state. Splitting separates the two into a lean source file and a
//! snapshot file; merging reattaches outputs to source by block id, using
//! content hashes to detect blocks that were edited since the snapshot.

pub mod digest;
pub mod merge;
pub mod slug;
pub mod split;

pub use digest::{content_hash, snapshot_hash};
pub use merge::{merge_snapshot, MergeOptions, MergeOutcome, StalePolicy};
pub use slug::slugify_project_name;
pub use split::{has_outputs, split_file, SplitFile};
