use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// External unit classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    /// Accepted on input only; imported like markdown
    Raw,
}

/// Cell source as written by Jupyter: one string or a list of lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl CellSource {
    /// Split text into Jupyter's line-list form (newlines kept on each line)
    pub fn from_text(text: &str) -> Self {
        CellSource::Lines(text.split_inclusive('\n').map(str::to_string).collect())
    }

    /// Join into a single string
    pub fn to_text(&self) -> String {
        match self {
            CellSource::Text(text) => text.clone(),
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

/// Jupyter notebook document (nbformat 4)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JupyterNotebook {
    #[serde(default)]
    pub cells: Vec<JupyterCell>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(default = "default_nbformat")]
    pub nbformat: u32,

    #[serde(default = "default_nbformat_minor")]
    pub nbformat_minor: u32,
}

fn default_nbformat() -> u32 {
    4
}

fn default_nbformat_minor() -> u32 {
    5
}

impl JupyterNotebook {
    /// Create an empty nbformat 4.5 document
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            metadata: Map::new(),
            nbformat: default_nbformat(),
            nbformat_minor: default_nbformat_minor(),
        }
    }
}

impl Default for JupyterNotebook {
    fn default() -> Self {
        Self::new()
    }
}

/// One Jupyter cell
///
/// `execution_count` distinguishes "absent" (`None`, markdown cells) from
/// "present but null" (`Some(None)`, never-run code cells).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JupyterCell {
    pub cell_type: CellType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub source: CellSource,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_count: Option<Option<u64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Value>>,

    /// Fields not modelled above (attachments, ...), preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl JupyterCell {
    /// Create a markdown cell
    pub fn markdown(source: &str) -> Self {
        Self {
            cell_type: CellType::Markdown,
            id: None,
            source: CellSource::from_text(source),
            metadata: Map::new(),
            execution_count: None,
            outputs: None,
            extra: BTreeMap::new(),
        }
    }

    /// Create a never-executed code cell
    pub fn code(source: &str) -> Self {
        Self {
            cell_type: CellType::Code,
            id: None,
            source: CellSource::from_text(source),
            metadata: Map::new(),
            execution_count: Some(None),
            outputs: Some(Vec::new()),
            extra: BTreeMap::new(),
        }
    }
}

/// Map a present field to `Some`, keeping `null` as `Some(None)`
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_line_list_joins() {
        let cell: JupyterCell = serde_json::from_str(
            r#"{"cell_type":"code","source":["a = 1\n","b = 2"],"metadata":{},"outputs":[],"execution_count":null}"#,
        )
        .unwrap();
        assert_eq!(cell.source.to_text(), "a = 1\nb = 2");
        assert_eq!(cell.execution_count, Some(None));
    }

    #[test]
    fn test_markdown_cell_omits_execution_fields() {
        let cell = JupyterCell::markdown("# Title");
        let json = serde_json::to_value(&cell).unwrap();
        assert!(json.get("execution_count").is_none());
        assert!(json.get("outputs").is_none());
    }

    #[test]
    fn test_code_cell_writes_null_execution_count() {
        let cell = JupyterCell::code("print(1)");
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json.get("execution_count"), Some(&Value::Null));
        assert_eq!(json.get("outputs"), Some(&Value::Array(Vec::new())));
    }

    #[test]
    fn test_from_text_keeps_newlines() {
        let source = CellSource::from_text("a\nb\n");
        assert_eq!(
            source,
            CellSource::Lines(vec!["a\n".to_string(), "b\n".to_string()])
        );
        assert_eq!(source.to_text(), "a\nb\n");
    }
}
