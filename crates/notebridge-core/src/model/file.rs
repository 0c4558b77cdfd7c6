use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::block::Block;
use super::project::Project;
use crate::errors::{NotebridgeError, Result};

/// Current canonical file format version
pub const FILE_VERSION: &str = "1.0";

/// File-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Aggregate digest of executable blocks; snapshot files only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_hash: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FileMetadata {
    /// Metadata stamped with a creation time
    pub fn created(created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        Self {
            modified_at: Some(created_at.clone()),
            created_at,
            exported_at: None,
            checksum: None,
            snapshot_hash: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Canonical project file (`.deepnote`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepnoteFile {
    pub version: String,

    pub metadata: FileMetadata,

    /// Runtime environment description; snapshot files only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Value>,

    /// Execution run summary; snapshot files only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<Value>,

    pub project: Project,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DeepnoteFile {
    /// Freshly constructed file around an empty project
    pub fn empty(project_id: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            version: FILE_VERSION.to_string(),
            metadata: FileMetadata::created(now_rfc3339()),
            environment: None,
            execution: None,
            project: Project::new(project_id, project_name),
            extra: BTreeMap::new(),
        }
    }

    /// Parse a canonical YAML document
    ///
    /// # Errors
    ///
    /// Returns `NotebridgeError::Parse` if the YAML is malformed or does not
    /// match the canonical schema.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| NotebridgeError::parse("deepnote", e.to_string()))
    }

    /// Serialize to canonical YAML
    ///
    /// # Errors
    ///
    /// Returns `NotebridgeError::Serialization` if a value cannot be encoded.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// All blocks across all notebooks, in stored order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.project.notebooks.iter().flat_map(|n| n.blocks.iter())
    }

    /// Mutable access to all blocks, in stored order
    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.project
            .notebooks
            .iter_mut()
            .flat_map(|n| n.blocks.iter_mut())
    }
}

/// Current UTC time in RFC 3339 with millisecond precision
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: "1.0"
metadata:
  createdAt: "2025-01-01T00:00:00.000Z"
  futureField: kept
project:
  id: p1
  name: Demo
  notebooks:
    - id: nb1
      name: Main
      executionMode: downstream
      blocks:
        - id: b1
          blockGroup: g1
          sortingKey: "000000"
          type: code
          content: print(1)
          metadata: {}
          executionCount: 3
"#;

    #[test]
    fn test_parse_minimal_file() {
        let file = DeepnoteFile::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(file.project.id, "p1");
        assert_eq!(file.project.notebooks.len(), 1);
        let block = &file.project.notebooks[0].blocks[0];
        assert_eq!(block.content, "print(1)");
        assert_eq!(block.execution_count, Some(3));
        assert_eq!(
            file.metadata.extra.get("futureField"),
            Some(&Value::String("kept".to_string()))
        );
    }

    #[test]
    fn test_unknown_fields_survive_reserialization() {
        let file = DeepnoteFile::from_yaml_str(MINIMAL).unwrap();
        let yaml = file.to_yaml_string().unwrap();
        let reparsed = DeepnoteFile::from_yaml_str(&yaml).unwrap();
        assert_eq!(file, reparsed);
    }

    #[test]
    fn test_malformed_yaml_is_parse_failure() {
        let err = DeepnoteFile::from_yaml_str("project: [unclosed").unwrap_err();
        assert!(matches!(err, NotebridgeError::Parse { .. }));
    }

    #[test]
    fn test_empty_file_has_no_notebooks() {
        let file = DeepnoteFile::empty("p1", "Demo");
        assert_eq!(file.version, FILE_VERSION);
        assert!(file.project.notebooks.is_empty());
        assert!(file.metadata.snapshot_hash.is_none());
    }
}
