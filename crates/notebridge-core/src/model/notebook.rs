use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::block::Block;

/// How a notebook re-runs blocks after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Only the edited block runs
    #[default]
    Block,
    /// The edited block and everything downstream of it runs
    Downstream,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Block => "block",
            ExecutionMode::Downstream => "downstream",
        }
    }

    /// Parse a wire name, `None` for anything unrecognized
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "block" => Some(ExecutionMode::Block),
            "downstream" => Some(ExecutionMode::Downstream),
            _ => None,
        }
    }
}

/// Ordered collection of blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub blocks: Vec<Block>,

    #[serde(default)]
    pub execution_mode: ExecutionMode,

    #[serde(default)]
    pub is_module: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Notebook {
    /// Create an empty notebook in block execution mode
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            blocks: Vec::new(),
            execution_mode: ExecutionMode::default(),
            is_module: false,
            working_directory: None,
            extra: BTreeMap::new(),
        }
    }

    /// Blocks in sorting-key order
    ///
    /// The sort is stable, so blocks sharing a key keep their stored order.
    pub fn sorted_blocks(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks.iter().collect();
        blocks.sort_by(|a, b| a.sorting_key.cmp(&b.sorting_key));
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockType;

    #[test]
    fn test_sorted_blocks_orders_by_key() {
        let mut notebook = Notebook::new("nb1", "Main");
        notebook
            .blocks
            .push(Block::new("b2", BlockType::Code, "", "g", "000002"));
        notebook
            .blocks
            .push(Block::new("b1", BlockType::Code, "", "g", "000001"));

        let ids: Vec<&str> = notebook
            .sorted_blocks()
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b1", "b2"]);
    }

    #[test]
    fn test_execution_mode_wire_names() {
        assert_eq!(ExecutionMode::parse("downstream"), Some(ExecutionMode::Downstream));
        assert_eq!(ExecutionMode::parse("eager"), None);
        assert_eq!(ExecutionMode::Block.as_str(), "block");
    }
}
