//! Conversion configuration.
//!
//! Loaded from a `notebridge.toml` file by the store crate; every section and
//! key is optional.
//!
//! ```toml
//! [import]
//! default_project_name = "Imported"
//!
//! [export]
//! marimo_generated_with = "0.10.0"
//!
//! [snapshot]
//! dir_name = "snapshots"
//! stale_policy = "drop_outputs"
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{NotebridgeError, Result};
use crate::snapshot::StalePolicy;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Import settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Project name used when imported documents carry none
    #[serde(default)]
    pub default_project_name: Option<String>,
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Value written to `__generated_with` in marimo apps
    #[serde(default = "default_marimo_generated_with")]
    pub marimo_generated_with: String,
}

fn default_marimo_generated_with() -> String {
    "0.10.0".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            marimo_generated_with: default_marimo_generated_with(),
        }
    }
}

/// Snapshot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Directory, relative to the source file, holding snapshot files
    #[serde(default = "default_dir_name")]
    pub dir_name: String,

    #[serde(default)]
    pub stale_policy: StalePolicy,
}

fn default_dir_name() -> String {
    "snapshots".to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir_name: default_dir_name(),
            stale_policy: StalePolicy::default(),
        }
    }
}

impl ConvertConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns `NotebridgeError::Parse` if the TOML is malformed or a value
    /// has the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| NotebridgeError::parse("toml", e.to_string()))
    }
}
