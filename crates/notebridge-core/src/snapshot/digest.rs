//! Content digests for snapshot bookkeeping.
//!
//! ## Digest Types
//!
//! - **Content hash**: `sha256:<hex>` of a block's verbatim content
//! - **Snapshot hash**: content hash of the canonical JSON list of
//!   `{id, contentHash, outputs}` over executable blocks, in stored order
//!
//! ## Determinism Guarantees
//!
//! - Same input → same digest (canonical JSON serialization, sorted keys)
//! - Different block order → different snapshot hash

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::model::DeepnoteFile;

const HASH_PREFIX: &str = "sha256:";

/// Digest of `text`, prefixed with the algorithm name
///
/// ## Example
///
/// ```
/// use notebridge_core::snapshot::content_hash;
///
/// let hash = content_hash("print(1)");
/// assert!(hash.starts_with("sha256:"));
/// assert_eq!(hash.len(), "sha256:".len() + 64);
/// ```
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{}{}", HASH_PREFIX, hex::encode(hasher.finalize()))
}

/// Aggregate digest of every executable block's hash and outputs
///
/// Blocks without a stamped `contentHash` are hashed on the fly.
///
/// ## Errors
///
/// Returns `NotebridgeError::Serialization` if JSON serialization fails.
pub fn snapshot_hash(file: &DeepnoteFile) -> Result<String> {
    let entries: Vec<Value> = file
        .blocks()
        .filter(|b| b.block_type.is_executable())
        .map(|b| {
            let hash = b
                .content_hash
                .clone()
                .unwrap_or_else(|| content_hash(&b.content));
            json!({
                "id": b.id,
                "contentHash": hash,
                "outputs": b.outputs.clone().unwrap_or_default(),
            })
        })
        .collect();

    let canonical = serde_json::to_string(&entries)?;
    Ok(content_hash(&canonical))
}
