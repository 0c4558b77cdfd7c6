use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::cell::CellType;
use super::metadata::Metadata;

/// Block type
///
/// Known types get their own variant so code generation and classification
/// can match exhaustively. Types written by newer producers are kept verbatim
/// in `Other` and treated as non-executable markdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Code,
    Markdown,
    Sql,
    NotebookFunction,
    Visualization,
    BigNumber,
    Button,
    InputText,
    InputTextarea,
    InputCheckbox,
    InputSelect,
    InputSlider,
    InputDate,
    InputDateRange,
    InputFile,
    TextCellH1,
    TextCellH2,
    TextCellH3,
    TextCellP,
    TextCellBullet,
    TextCellTodo,
    TextCellCallout,
    Separator,
    Image,
    Other(String),
}

impl BlockType {
    /// Every known variant, in a stable order
    pub const KNOWN: [BlockType; 24] = [
        BlockType::Code,
        BlockType::Markdown,
        BlockType::Sql,
        BlockType::NotebookFunction,
        BlockType::Visualization,
        BlockType::BigNumber,
        BlockType::Button,
        BlockType::InputText,
        BlockType::InputTextarea,
        BlockType::InputCheckbox,
        BlockType::InputSelect,
        BlockType::InputSlider,
        BlockType::InputDate,
        BlockType::InputDateRange,
        BlockType::InputFile,
        BlockType::TextCellH1,
        BlockType::TextCellH2,
        BlockType::TextCellH3,
        BlockType::TextCellP,
        BlockType::TextCellBullet,
        BlockType::TextCellTodo,
        BlockType::TextCellCallout,
        BlockType::Separator,
        BlockType::Image,
    ];

    /// Wire name used in canonical files and cell metadata
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Code => "code",
            BlockType::Markdown => "markdown",
            BlockType::Sql => "sql",
            BlockType::NotebookFunction => "notebook-function",
            BlockType::Visualization => "visualization",
            BlockType::BigNumber => "big-number",
            BlockType::Button => "button",
            BlockType::InputText => "input-text",
            BlockType::InputTextarea => "input-textarea",
            BlockType::InputCheckbox => "input-checkbox",
            BlockType::InputSelect => "input-select",
            BlockType::InputSlider => "input-slider",
            BlockType::InputDate => "input-date",
            BlockType::InputDateRange => "input-date-range",
            BlockType::InputFile => "input-file",
            BlockType::TextCellH1 => "text-cell-h1",
            BlockType::TextCellH2 => "text-cell-h2",
            BlockType::TextCellH3 => "text-cell-h3",
            BlockType::TextCellP => "text-cell-p",
            BlockType::TextCellBullet => "text-cell-bullet",
            BlockType::TextCellTodo => "text-cell-todo",
            BlockType::TextCellCallout => "text-cell-callout",
            BlockType::Separator => "separator",
            BlockType::Image => "image",
            BlockType::Other(name) => name,
        }
    }

    /// External cell classification
    ///
    /// Depends on the type alone, never on block content.
    pub fn cell_type(&self) -> CellType {
        match self {
            BlockType::Code
            | BlockType::Sql
            | BlockType::NotebookFunction
            | BlockType::Visualization
            | BlockType::BigNumber
            | BlockType::Button
            | BlockType::InputText
            | BlockType::InputTextarea
            | BlockType::InputCheckbox
            | BlockType::InputSelect
            | BlockType::InputSlider
            | BlockType::InputDate
            | BlockType::InputDateRange
            | BlockType::InputFile => CellType::Code,
            BlockType::Markdown
            | BlockType::TextCellH1
            | BlockType::TextCellH2
            | BlockType::TextCellH3
            | BlockType::TextCellP
            | BlockType::TextCellBullet
            | BlockType::TextCellTodo
            | BlockType::TextCellCallout
            | BlockType::Separator
            | BlockType::Image
            | BlockType::Other(_) => CellType::Markdown,
        }
    }

    /// Whether the block runs in a kernel and owns outputs
    pub fn is_executable(&self) -> bool {
        matches!(
            self,
            BlockType::Code
                | BlockType::Sql
                | BlockType::NotebookFunction
                | BlockType::Visualization
                | BlockType::BigNumber
                | BlockType::Button
                | BlockType::InputText
                | BlockType::InputTextarea
                | BlockType::InputCheckbox
                | BlockType::InputSelect
                | BlockType::InputSlider
                | BlockType::InputDate
                | BlockType::InputDateRange
                | BlockType::InputFile
        )
    }

    /// Whether this is an input widget block
    pub fn is_input(&self) -> bool {
        self.as_str().starts_with("input-") && !matches!(self, BlockType::Other(_))
    }
}

impl From<&str> for BlockType {
    fn from(value: &str) -> Self {
        BlockType::KNOWN
            .iter()
            .find(|known| known.as_str() == value)
            .cloned()
            .unwrap_or_else(|| BlockType::Other(value.to_string()))
    }
}

impl From<String> for BlockType {
    fn from(value: String) -> Self {
        BlockType::from(value.as_str())
    }
}

impl From<BlockType> for String {
    fn from(value: BlockType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic notebook unit
///
/// `content` is always the verbatim canonical source. Execution fields are
/// optional and live only in snapshot-side or unsplit files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Stable block identifier, never rewritten by conversions
    pub id: String,

    /// Opaque grouping id, copied through unmodified
    pub block_group: String,

    /// Order-imposing key within the owning notebook
    pub sorting_key: String,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_started_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_finished_at: Option<String>,

    /// `sha256:<hex>` digest of `content`, stamped by snapshot split
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Fields not modelled above, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Block {
    /// Create a block with no metadata or execution state
    pub fn new(
        id: impl Into<String>,
        block_type: BlockType,
        content: impl Into<String>,
        block_group: impl Into<String>,
        sorting_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            block_group: block_group.into(),
            sorting_key: sorting_key.into(),
            block_type,
            content: content.into(),
            metadata: Metadata::new(),
            execution_count: None,
            outputs: None,
            execution_started_at: None,
            execution_finished_at: None,
            content_hash: None,
            version: None,
            extra: BTreeMap::new(),
        }
    }

    /// Check if the block carries at least one output
    pub fn has_outputs(&self) -> bool {
        self.outputs.as_ref().is_some_and(|o| !o.is_empty())
    }

    /// Drop every execution-derived field
    pub fn clear_execution_state(&mut self) {
        self.execution_count = None;
        self.outputs = None;
        self.execution_started_at = None;
        self.execution_finished_at = None;
    }
}
