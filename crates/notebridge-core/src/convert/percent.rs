//! Percent-delimited Python scripts (`# %%`).
//!
//! ```text
//! # %% [markdown]
//! # # Title
//!
//! # %% Load data tags=["setup"]
//! import pandas as pd
//! ```

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::jupyter::{export_jupyter, import_jupyter, ExportOptions, ImportOptions, NamedNotebook};
use super::{file_stem, ExportedScript};
use crate::errors::Result;
use crate::model::{CellType, DeepnoteFile, JupyterCell, JupyterNotebook};

const TITLE_KEY: &str = "title";
const TAGS_KEY: &str = "tags";

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^# %%(.*)$").expect("static regex"))
}

fn tags_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"tags\s*=\s*(\[[^\]]*\])").expect("static regex"))
}

struct Marker {
    cell_type: CellType,
    title: Option<String>,
    tags: Option<Vec<String>>,
}

fn parse_marker(rest: &str) -> Marker {
    let mut rest = rest.trim().to_string();
    let mut cell_type = CellType::Code;
    for prefix in ["[markdown]", "[md]"] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            cell_type = CellType::Markdown;
            rest = stripped.trim().to_string();
            break;
        }
    }

    let mut tags = None;
    if let Some(caps) = tags_re().captures(&rest) {
        tags = serde_json::from_str::<Vec<String>>(&caps[1]).ok();
        let whole = caps[0].to_string();
        rest = rest.replacen(&whole, "", 1).trim().to_string();
    }

    Marker {
        cell_type,
        title: Some(rest).filter(|t| !t.is_empty()),
        tags,
    }
}

fn trim_blank_lines<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].to_vec(),
        _ => Vec::new(),
    }
}

fn build_cell(marker: &Marker, body: &[&str]) -> JupyterCell {
    let lines = trim_blank_lines(body);
    let mut cell = match marker.cell_type {
        CellType::Code => JupyterCell::code(&lines.join("\n")),
        CellType::Markdown | CellType::Raw => {
            let text: Vec<&str> = lines
                .iter()
                .map(|l| {
                    if *l == "#" {
                        ""
                    } else {
                        l.strip_prefix("# ").unwrap_or(l)
                    }
                })
                .collect();
            JupyterCell::markdown(&text.join("\n"))
        }
    };
    if let Some(title) = &marker.title {
        cell.metadata.insert(TITLE_KEY.into(), Value::from(title.as_str()));
    }
    if let Some(tags) = &marker.tags {
        cell.metadata.insert(TAGS_KEY.into(), Value::from(tags.clone()));
    }
    cell
}

/// Split a percent script into cells
///
/// Non-blank text before the first marker becomes a leading code cell.
pub fn parse_percent(content: &str) -> JupyterNotebook {
    let mut notebook = JupyterNotebook::new();
    let mut current = Marker {
        cell_type: CellType::Code,
        title: None,
        tags: None,
    };
    let mut body: Vec<&str> = Vec::new();
    let mut seen_marker = false;

    for line in content.lines() {
        if let Some(caps) = marker_re().captures(line) {
            if seen_marker || !trim_blank_lines(&body).is_empty() {
                notebook.cells.push(build_cell(&current, &body));
            }
            current = parse_marker(caps.get(1).map_or("", |m| m.as_str()));
            body.clear();
            seen_marker = true;
        } else {
            body.push(line);
        }
    }
    if seen_marker || !trim_blank_lines(&body).is_empty() {
        notebook.cells.push(build_cell(&current, &body));
    }

    notebook
}

fn marker_line(cell: &JupyterCell) -> String {
    let mut line = String::from("# %%");
    if cell.cell_type != CellType::Code {
        line.push_str(" [markdown]");
    }
    if let Some(title) = cell.metadata.get(TITLE_KEY).and_then(Value::as_str) {
        let title = title.replace('\n', " ");
        if !title.trim().is_empty() {
            line.push(' ');
            line.push_str(title.trim());
        }
    }
    if let Some(tags) = cell.metadata.get(TAGS_KEY).and_then(Value::as_array) {
        let rendered: Vec<String> = tags
            .iter()
            .filter_map(Value::as_str)
            .map(|t| Value::from(t).to_string())
            .collect();
        if !rendered.is_empty() {
            line.push_str(&format!(" tags=[{}]", rendered.join(", ")));
        }
    }
    line
}

/// Render cells as a percent script
pub fn render_percent(notebook: &JupyterNotebook) -> String {
    let mut out = String::new();
    for (i, cell) in notebook.cells.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&marker_line(cell));
        out.push('\n');

        let text = cell.source.to_text();
        let text = text.trim_end_matches('\n');
        match cell.cell_type {
            CellType::Code => {
                if !text.is_empty() {
                    out.push_str(text);
                    out.push('\n');
                }
            }
            CellType::Markdown | CellType::Raw => {
                for line in text.lines() {
                    if line.is_empty() {
                        out.push_str("#\n");
                    } else {
                        out.push_str("# ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
            }
        }
    }
    out
}

/// Import a percent script as a one-notebook project
///
/// # Errors
///
/// Propagates mapper failures from [`import_jupyter`].
pub fn import_percent(file_name: &str, content: &str, options: &ImportOptions<'_>) -> Result<DeepnoteFile> {
    let document = NamedNotebook::new(file_name, parse_percent(content));
    import_jupyter(&[document], options)
}

/// Export every notebook of `file` as a percent script
///
/// # Errors
///
/// Propagates mapper failures from [`export_jupyter`].
pub fn export_percent(file: &DeepnoteFile, options: &ExportOptions<'_>) -> Result<Vec<ExportedScript>> {
    Ok(export_jupyter(file, options)?
        .into_iter()
        .map(|exported| ExportedScript {
            file_name: format!("{}.py", file_stem(&exported.file_name)),
            notebook_id: exported.notebook_id,
            content: render_percent(&exported.notebook),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCRIPT: &str = r#"# %% [markdown]
# # Data Analysis
#
# Intro text.

# %%
import pandas as pd

# %% tags=["exploration"]
df.describe()

# %% Analysis code tags=["analysis", "groupby"]
stats = df.groupby('department')
"#;

    #[test]
    fn test_parse_cells_and_markers() {
        let notebook = parse_percent(SCRIPT);
        assert_eq!(notebook.cells.len(), 4);

        let md = &notebook.cells[0];
        assert_eq!(md.cell_type, CellType::Markdown);
        assert_eq!(md.source.to_text(), "# Data Analysis\n\nIntro text.");

        assert_eq!(notebook.cells[1].source.to_text(), "import pandas as pd");
        assert_eq!(notebook.cells[2].metadata.get("tags"), Some(&json!(["exploration"])));

        let titled = &notebook.cells[3];
        assert_eq!(titled.metadata.get("title"), Some(&json!("Analysis code")));
        assert_eq!(titled.metadata.get("tags"), Some(&json!(["analysis", "groupby"])));
    }

    #[test]
    fn test_render_reproduces_script() {
        assert_eq!(render_percent(&parse_percent(SCRIPT)), SCRIPT);
    }

    #[test]
    fn test_header_before_first_marker_becomes_code() {
        let notebook = parse_percent("import os\n\n# %%\nx = 1\n");
        assert_eq!(notebook.cells.len(), 2);
        assert_eq!(notebook.cells[0].source.to_text(), "import os");
    }

    #[test]
    fn test_empty_script_has_no_cells() {
        assert!(parse_percent("").cells.is_empty());
        assert!(parse_percent("\n\n").cells.is_empty());
    }
}
