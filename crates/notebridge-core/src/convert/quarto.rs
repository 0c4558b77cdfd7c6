//! Quarto markdown documents (`.qmd`).
//!
//! Executable chunks (```` ```{python} ````) become code cells, with their
//! leading `#| key: value` lines kept as `quarto_options` metadata. Prose
//! between chunks becomes markdown cells, and the front matter `title` names
//! the notebook.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::jupyter::{export_jupyter, import_jupyter, ExportOptions, ImportOptions, NamedNotebook};
use super::metadata::NOTEBOOK_NAME;
use super::{file_stem, set_default, ExportedScript};
use crate::errors::{NotebridgeError, Result};
use crate::model::{CellType, DeepnoteFile, JupyterCell, JupyterNotebook};

const OPTIONS_KEY: &str = "quarto_options";
const LANGUAGE_KEY: &str = "quarto_language";
const DEFAULT_LANGUAGE: &str = "python";

fn chunk_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```\s*\{([A-Za-z0-9_]+)[^}]*\}\s*$").expect("static regex"))
}

fn option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#\|\s*([A-Za-z0-9_.-]+)\s*:\s*(.*)$").expect("static regex"))
}

fn option_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::String(String::new());
    }
    serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn push_prose(notebook: &mut JupyterNotebook, lines: &mut Vec<&str>) {
    let text = lines.join("\n");
    let text = text.trim_matches('\n');
    if !text.trim().is_empty() {
        notebook.cells.push(JupyterCell::markdown(text));
    }
    lines.clear();
}

/// Parse a Quarto document into cells
///
/// # Errors
///
/// Returns `NotebridgeError::Parse` if the front matter is unterminated or
/// not valid YAML, or a code chunk is never closed.
pub fn parse_quarto(content: &str) -> Result<JupyterNotebook> {
    let mut notebook = JupyterNotebook::new();
    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    if lines.first().is_some_and(|l| l.trim_end() == "---") {
        let end = lines[1..]
            .iter()
            .position(|l| matches!(l.trim_end(), "---" | "..."))
            .map(|p| p + 1)
            .ok_or_else(|| NotebridgeError::parse("quarto", "unterminated front matter"))?;
        let yaml = lines[1..end].join("\n");
        if !yaml.trim().is_empty() {
            let front: Value = serde_yaml::from_str(&yaml)
                .map_err(|e| NotebridgeError::parse("quarto", format!("front matter: {}", e)))?;
            if let Some(title) = front.get("title").and_then(Value::as_str) {
                set_default(&mut notebook.metadata, NOTEBOOK_NAME, title);
            }
        }
        i = end + 1;
    }

    let mut prose: Vec<&str> = Vec::new();
    while i < lines.len() {
        let Some(caps) = chunk_open_re().captures(lines[i]) else {
            prose.push(lines[i]);
            i += 1;
            continue;
        };
        push_prose(&mut notebook, &mut prose);

        let opened_at = i + 1;
        let language = caps[1].to_string();
        i += 1;

        let mut options = Map::new();
        while i < lines.len() {
            match option_re().captures(lines[i]) {
                Some(opt) => {
                    options.insert(opt[1].to_string(), option_value(&opt[2]));
                    i += 1;
                }
                None => break,
            }
        }

        let body_start = i;
        while i < lines.len() && lines[i].trim_end() != "```" {
            i += 1;
        }
        if i >= lines.len() {
            return Err(NotebridgeError::parse(
                "quarto",
                format!("code chunk opened on line {} is never closed", opened_at),
            ));
        }

        let mut cell = JupyterCell::code(&lines[body_start..i].join("\n"));
        if !options.is_empty() {
            cell.metadata.insert(OPTIONS_KEY.into(), Value::Object(options));
        }
        if language != DEFAULT_LANGUAGE {
            cell.metadata.insert(LANGUAGE_KEY.into(), Value::String(language));
        }
        notebook.cells.push(cell);
        i += 1;
    }
    push_prose(&mut notebook, &mut prose);

    Ok(notebook)
}

/// Render cells as a Quarto document
pub fn render_quarto(notebook: &JupyterNotebook) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = notebook.metadata.get(NOTEBOOK_NAME).and_then(Value::as_str) {
        parts.push(format!("---\ntitle: {}\n---", Value::from(title)));
    }

    for cell in &notebook.cells {
        let text = cell.source.to_text();
        let text = text.trim_matches('\n');
        match cell.cell_type {
            CellType::Code => {
                let language = cell
                    .metadata
                    .get(LANGUAGE_KEY)
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_LANGUAGE);
                let mut chunk = format!("```{{{}}}\n", language);
                if let Some(options) = cell.metadata.get(OPTIONS_KEY).and_then(Value::as_object) {
                    for (key, value) in options {
                        let rendered = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        chunk.push_str(&format!("#| {}: {}\n", key, rendered));
                    }
                }
                if !text.is_empty() {
                    chunk.push_str(text);
                    chunk.push('\n');
                }
                chunk.push_str("```");
                parts.push(chunk);
            }
            CellType::Markdown | CellType::Raw => {
                if !text.trim().is_empty() {
                    parts.push(text.to_string());
                }
            }
        }
    }

    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

/// Import a Quarto document as a one-notebook project
///
/// # Errors
///
/// Returns `NotebridgeError::Parse` for malformed documents and propagates
/// mapper failures from [`import_jupyter`].
pub fn import_quarto(file_name: &str, content: &str, options: &ImportOptions<'_>) -> Result<DeepnoteFile> {
    let document = NamedNotebook::new(file_name, parse_quarto(content)?);
    import_jupyter(&[document], options)
}

/// Export every notebook of `file` as a Quarto document
///
/// # Errors
///
/// Propagates mapper failures from [`export_jupyter`].
pub fn export_quarto(file: &DeepnoteFile, options: &ExportOptions<'_>) -> Result<Vec<ExportedScript>> {
    Ok(export_jupyter(file, options)?
        .into_iter()
        .map(|exported| ExportedScript {
            file_name: format!("{}.qmd", file_stem(&exported.file_name)),
            notebook_id: exported.notebook_id,
            content: render_quarto(&exported.notebook),
        })
        .collect())
}
