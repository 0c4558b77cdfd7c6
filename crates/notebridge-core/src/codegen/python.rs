//! Python equivalents of executable block types.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::generation_error;
use crate::errors::Result;
use crate::model::{Block, BlockType};

const VARIABLE_NAME: &str = "deepnote_variable_name";
const VARIABLE_VALUE: &str = "deepnote_variable_value";

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

/// Generate Python source for an executable block
///
/// # Errors
///
/// Returns `NotebridgeError::SourceGeneration` if required metadata is
/// missing or malformed, or the type is not executable.
pub fn python_source(block: &Block) -> Result<String> {
    match &block.block_type {
        BlockType::Code => Ok(block.content.clone()),
        BlockType::Sql => sql_source(block),
        BlockType::InputText
        | BlockType::InputTextarea
        | BlockType::InputDate
        | BlockType::InputFile => {
            let name = variable_name(block)?;
            let value = block
                .metadata
                .get(VARIABLE_VALUE)
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok(format!("{} = {}\n", name, py_str(value)))
        }
        BlockType::InputCheckbox => {
            let name = variable_name(block)?;
            let checked = block.metadata.get_bool(VARIABLE_VALUE).unwrap_or(false);
            Ok(format!("{} = {}\n", name, py_bool(checked)))
        }
        BlockType::InputSlider => {
            let name = variable_name(block)?;
            let value = slider_value(block)?;
            Ok(format!("{} = {}\n", name, value))
        }
        BlockType::InputSelect | BlockType::InputDateRange => {
            let name = variable_name(block)?;
            let value = block.metadata.get(VARIABLE_VALUE).cloned().unwrap_or(Value::Null);
            Ok(format!("{} = {}\n", name, py_literal(&value)))
        }
        BlockType::Visualization => {
            let name = variable_name(block)?;
            let spec = block
                .metadata
                .get("deepnote_visualization_spec")
                .ok_or_else(|| generation_error(block, "missing visualization spec"))?;
            Ok(format!(
                "_dntk.DeepnoteChart({}, {})\n",
                name,
                py_str(&spec.to_string())
            ))
        }
        BlockType::BigNumber => {
            let value = block
                .metadata
                .get_str("deepnote_big_number_value")
                .filter(|v| identifier_re().is_match(v))
                .ok_or_else(|| generation_error(block, "missing or invalid big number value"))?;
            let title = block
                .metadata
                .get_str("deepnote_big_number_title")
                .unwrap_or_default();
            Ok(format!("_dntk.big_number({}, {})\n", py_str(title), value))
        }
        BlockType::Button => button_source(block),
        BlockType::NotebookFunction => {
            let target = block
                .metadata
                .get_str("function_notebook_id")
                .ok_or_else(|| generation_error(block, "missing function notebook id"))?;
            let inputs = block
                .metadata
                .get("function_notebook_inputs")
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default()));
            Ok(format!(
                "_dntk.run_notebook_function({}, inputs={})\n",
                py_str(target),
                py_literal(&inputs)
            ))
        }
        other => Err(generation_error(
            block,
            format!("{} blocks have no Python form", other),
        )),
    }
}

fn sql_source(block: &Block) -> Result<String> {
    let name = match block.metadata.get_str(VARIABLE_NAME) {
        Some(name) => checked_identifier(block, name)?,
        None => "df",
    };
    let env_var = match block.metadata.get_str("sql_integration_id") {
        Some(id) => format!("SQL_{}", id.to_ascii_uppercase().replace('-', "_")),
        None => "SQL_DEEPNOTE_DATAFRAME_SQL".to_string(),
    };
    let return_type = block
        .metadata
        .get_str("deepnote_return_variable_type")
        .unwrap_or("dataframe");

    Ok(format!(
        "{name} = _dntk.execute_sql(\n    {query},\n    {env},\n    return_variable_type={rtype},\n)\n{name}\n",
        name = name,
        query = py_str(&block.content),
        env = py_str(&env_var),
        rtype = py_str(return_type),
    ))
}

fn button_source(block: &Block) -> Result<String> {
    let title = block
        .metadata
        .get_str("deepnote_button_title")
        .unwrap_or("Run");
    match block.metadata.get_str("deepnote_button_behavior") {
        Some("set_variable") => {
            let name = variable_name(block)?;
            Ok(format!("{} = False\n", name))
        }
        _ => Ok(format!("# Button: {}\n", title.replace('\n', " "))),
    }
}

fn slider_value(block: &Block) -> Result<String> {
    match block.metadata.get(VARIABLE_VALUE) {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|_| s.trim().to_string())
            .map_err(|_| generation_error(block, format!("slider value {:?} is not a number", s))),
        Some(_) => Err(generation_error(block, "slider value is not a number")),
        None => Ok("0".to_string()),
    }
}

fn variable_name(block: &Block) -> Result<&str> {
    let name = block
        .metadata
        .get_str(VARIABLE_NAME)
        .ok_or_else(|| generation_error(block, "missing variable name"))?;
    checked_identifier(block, name)
}

fn checked_identifier<'a>(block: &Block, name: &'a str) -> Result<&'a str> {
    if identifier_re().is_match(name) {
        Ok(name)
    } else {
        Err(generation_error(
            block,
            format!("{:?} is not a valid Python identifier", name),
        ))
    }
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Single-quoted Python string literal
pub(crate) fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Python literal for a JSON value
pub(crate) fn py_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => py_bool(*b).to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => py_str(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(py_literal).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", py_str(k), py_literal(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(block_type: BlockType, content: &str) -> Block {
        Block::new("b1", block_type, content, "g1", "000000")
    }

    #[test]
    fn test_sql_uses_integration_env_var() {
        let mut b = block(BlockType::Sql, "SELECT * FROM users WHERE name = 'x'");
        b.metadata.set(VARIABLE_NAME, json!("users"));
        b.metadata.set("sql_integration_id", json!("abc-123"));

        let source = python_source(&b).unwrap();
        assert!(source.starts_with("users = _dntk.execute_sql(\n"));
        assert!(source.contains(r"'SELECT * FROM users WHERE name = \'x\''"));
        assert!(source.contains("'SQL_ABC_123'"));
        assert!(source.ends_with("\nusers\n"));
    }

    #[test]
    fn test_input_text_assignment() {
        let mut b = block(BlockType::InputText, "");
        b.metadata.set(VARIABLE_NAME, json!("city"));
        b.metadata.set(VARIABLE_VALUE, json!("São Paulo"));
        assert_eq!(python_source(&b).unwrap(), "city = 'São Paulo'\n");
    }

    #[test]
    fn test_input_select_multi_value() {
        let mut b = block(BlockType::InputSelect, "");
        b.metadata.set(VARIABLE_NAME, json!("choices"));
        b.metadata.set(VARIABLE_VALUE, json!(["a", "b"]));
        assert_eq!(python_source(&b).unwrap(), "choices = ['a', 'b']\n");
    }

    #[test]
    fn test_checkbox_and_slider() {
        let mut cb = block(BlockType::InputCheckbox, "");
        cb.metadata.set(VARIABLE_NAME, json!("flag"));
        cb.metadata.set(VARIABLE_VALUE, json!(true));
        assert_eq!(python_source(&cb).unwrap(), "flag = True\n");

        let mut slider = block(BlockType::InputSlider, "");
        slider.metadata.set(VARIABLE_NAME, json!("n"));
        slider.metadata.set(VARIABLE_VALUE, json!("7"));
        assert_eq!(python_source(&slider).unwrap(), "n = 7\n");
    }

    #[test]
    fn test_missing_variable_name_fails() {
        let b = block(BlockType::InputText, "");
        let err = python_source(&b).unwrap_err();
        assert!(err.to_string().contains("missing variable name"));
    }

    #[test]
    fn test_invalid_identifier_fails() {
        let mut b = block(BlockType::InputText, "");
        b.metadata.set(VARIABLE_NAME, json!("not valid"));
        assert!(python_source(&b).is_err());
    }

    #[test]
    fn test_markdown_has_no_python_form() {
        assert!(python_source(&block(BlockType::Markdown, "# hi")).is_err());
    }

    #[test]
    fn test_py_literal_nested() {
        let value = json!({"a": [1, null, false]});
        assert_eq!(py_literal(&value), "{'a': [1, None, False]}");
    }
}
