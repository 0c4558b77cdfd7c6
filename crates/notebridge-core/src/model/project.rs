use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::metadata::Metadata;
use super::notebook::Notebook;

/// A project: notebooks plus the integrations and settings they share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_notebook_id: Option<String>,

    /// Opaque connection references
    #[serde(default)]
    pub integrations: Vec<Value>,

    #[serde(default)]
    pub notebooks: Vec<Notebook>,

    #[serde(default)]
    pub settings: Metadata,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Project {
    /// Create a project with no notebooks
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            init_notebook_id: None,
            integrations: Vec::new(),
            notebooks: Vec::new(),
            settings: Metadata::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Find a notebook by id
    pub fn notebook(&self, notebook_id: &str) -> Option<&Notebook> {
        self.notebooks.iter().find(|n| n.id == notebook_id)
    }

    /// Total block count across notebooks
    pub fn block_count(&self) -> usize {
        self.notebooks.iter().map(|n| n.blocks.len()).sum()
    }
}
