//! marimo app scripts.
//!
//! Each `@app.cell` function is one cell. A body consisting of a single
//! `mo.md(...)` call is markdown; anything else is code. Parameters and
//! return tuples describe marimo's dataflow graph and are not analysed:
//! import drops them, export writes empty signatures.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::jupyter::{export_jupyter, import_jupyter, ExportOptions, ImportOptions, NamedNotebook};
use super::metadata::NOTEBOOK_NAME;
use super::{file_stem, set_default, ExportedScript};
use crate::config::ConvertConfig;
use crate::errors::{NotebridgeError, Result};
use crate::model::{CellType, DeepnoteFile, JupyterCell, JupyterNotebook};

const HIDE_CODE_KEY: &str = "hide_code";
const DISABLED_KEY: &str = "disabled";
const MO_IMPORT: &str = "import marimo as mo";

/// marimo rendering settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarimoExportOptions {
    /// Version string written to `__generated_with`
    pub generated_with: String,
}

impl Default for MarimoExportOptions {
    fn default() -> Self {
        Self::from_config(&ConvertConfig::default())
    }
}

impl MarimoExportOptions {
    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            generated_with: config.export.marimo_generated_with.clone(),
        }
    }
}

fn app_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^app\s*=\s*marimo\.App\((.*)\)\s*$").expect("static regex"))
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"title\s*=\s*("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')"#).expect("static regex"))
}

fn decorator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@app\.cell(?:\((.*)\))?\s*$").expect("static regex"))
}

fn def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:async\s+)?def\s+\w+\s*\(.*\)\s*(?:->.*)?:\s*$").expect("static regex"))
}

fn markdown_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^mo\.md\(\s*(.*?)\s*\)$").expect("static regex"))
}

fn flag_set(args: &str, name: &str) -> bool {
    args.split(',')
        .filter_map(|part| part.split_once('='))
        .any(|(key, value)| key.trim() == name && value.trim() == "True")
}

/// Parse a marimo app into cells
///
/// The app title, when present, is recorded as the document's notebook name.
///
/// # Errors
///
/// Returns `NotebridgeError::Parse` if a cell decorator is not followed by a
/// function definition.
pub fn parse_marimo(content: &str) -> Result<JupyterNotebook> {
    let mut notebook = JupyterNotebook::new();
    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(caps) = app_re().captures(line) {
            if let Some(title) = title_re().captures(&caps[1]) {
                let title = unquote(&title[1]).unwrap_or_default();
                if !title.is_empty() {
                    set_default(&mut notebook.metadata, NOTEBOOK_NAME, title);
                }
            }
            i += 1;
            continue;
        }

        let Some(caps) = decorator_re().captures(line) else {
            i += 1;
            continue;
        };
        let args = caps.get(1).map_or("", |m| m.as_str());

        i += 1;
        if i >= lines.len() || !def_re().is_match(lines[i]) {
            return Err(NotebridgeError::parse(
                "marimo",
                format!("line {}: @app.cell is not followed by a function", i),
            ));
        }
        i += 1;

        let body_start = i;
        while i < lines.len() && (lines[i].trim().is_empty() || lines[i].starts_with([' ', '\t'])) {
            i += 1;
        }

        let mut cell = cell_from_body(&lines[body_start..i]);
        if flag_set(args, HIDE_CODE_KEY) {
            cell.metadata.insert(HIDE_CODE_KEY.into(), Value::Bool(true));
        }
        if flag_set(args, DISABLED_KEY) {
            cell.metadata.insert(DISABLED_KEY.into(), Value::Bool(true));
        }
        notebook.cells.push(cell);
    }

    Ok(notebook)
}

fn cell_from_body(lines: &[&str]) -> JupyterCell {
    let mut body: Vec<&str> = lines.to_vec();
    while body.last().is_some_and(|l| l.trim().is_empty()) {
        body.pop();
    }
    if body.last().is_some_and(|l| {
        let t = l.trim();
        t == "return" || t.starts_with("return ") || t.starts_with("return(")
    }) {
        body.pop();
    }

    let text = dedent(&body);
    let text = text.trim_matches('\n');

    if let Some(caps) = markdown_call_re().captures(text) {
        if let Some(markdown) = unquote(&caps[1]) {
            return JupyterCell::markdown(dedent_text(&markdown).trim_matches('\n'));
        }
    }
    JupyterCell::code(text)
}

/// Byte length of the leading run of ASCII spaces and tabs
fn leading_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Remove the indent shared by all non-blank lines
///
/// Only ASCII spaces and tabs count as indent; other whitespace is content.
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_indent(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| &l[leading_indent(l).min(indent)..])
        .collect::<Vec<_>>()
        .join("\n")
}

fn dedent_text(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    dedent(&lines)
}

/// Value of a Python string literal, `None` if `literal` is not one
fn unquote(literal: &str) -> Option<String> {
    let literal = literal.trim();
    let prefix_len = literal
        .find(['"', '\''])
        .filter(|&at| literal[..at].chars().all(|c| "rRfFuU".contains(c)) && at <= 2)?;
    let raw = literal[..prefix_len].contains(['r', 'R']);
    let quoted = &literal[prefix_len..];

    let inner = ["\"\"\"", "'''", "\"", "'"].iter().find_map(|q| {
        quoted
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .filter(|inner| quoted.len() >= 2 * q.len() && !contains_unescaped(inner, q))
    })?;

    if raw {
        return Some(inner.to_string());
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Some(out)
}

/// Whether `quote` occurs in `text` other than after a backslash
fn contains_unescaped(text: &str, quote: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(quote.as_bytes()) {
            return true;
        }
        i += 1;
    }
    false
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| if l.is_empty() { String::new() } else { format!("    {}", l) })
        .collect::<Vec<_>>()
        .join("\n")
}

fn markdown_literal(text: &str) -> String {
    if !text.contains("\"\"\"") {
        return format!("r\"\"\"\n{}\n\"\"\"", text);
    }
    let escaped = text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    format!("\"\"\"\n{}\n\"\"\"", escaped)
}

fn decorator(cell: &JupyterCell) -> String {
    let flag = |key: &str| cell.metadata.get(key).and_then(Value::as_bool).unwrap_or(false);
    let mut args = Vec::new();
    if flag(HIDE_CODE_KEY) {
        args.push("hide_code=True");
    }
    if flag(DISABLED_KEY) {
        args.push("disabled=True");
    }
    if args.is_empty() {
        "@app.cell".to_string()
    } else {
        format!("@app.cell({})", args.join(", "))
    }
}

/// Render cells as a marimo app
pub fn render_marimo(notebook: &JupyterNotebook, options: &MarimoExportOptions) -> String {
    let mut out = String::from("import marimo\n\n");
    out.push_str(&format!(
        "__generated_with = {}\n",
        Value::from(options.generated_with.as_str())
    ));
    match notebook.metadata.get(NOTEBOOK_NAME).and_then(Value::as_str) {
        Some(title) => out.push_str(&format!(
            "app = marimo.App(width=\"medium\", title={})\n",
            Value::from(title)
        )),
        None => out.push_str("app = marimo.App(width=\"medium\")\n"),
    }

    let has_markdown = notebook.cells.iter().any(|c| c.cell_type != CellType::Code);
    let imports_mo = notebook
        .cells
        .iter()
        .any(|c| c.cell_type == CellType::Code && c.source.to_text().trim() == MO_IMPORT);
    if has_markdown && !imports_mo {
        out.push_str(&format!("\n\n@app.cell\ndef __():\n    {}\n    return mo,\n", MO_IMPORT));
    }

    for cell in &notebook.cells {
        let text = cell.source.to_text();
        let text = text.trim_matches('\n');
        out.push_str("\n\n");
        out.push_str(&decorator(cell));
        out.push('\n');
        match cell.cell_type {
            CellType::Code => {
                out.push_str("def __():\n");
                if !text.is_empty() {
                    out.push_str(&indent(text));
                    out.push('\n');
                }
            }
            CellType::Markdown | CellType::Raw => {
                out.push_str("def __(mo):\n");
                out.push_str(&indent(&format!("mo.md({})", markdown_literal(text))));
                out.push('\n');
            }
        }
        out.push_str("    return\n");
    }

    out.push_str("\n\nif __name__ == \"__main__\":\n    app.run()\n");
    out
}

/// Import a marimo app as a one-notebook project
///
/// # Errors
///
/// Returns `NotebridgeError::Parse` for malformed cells and propagates mapper
/// failures from [`import_jupyter`].
pub fn import_marimo(file_name: &str, content: &str, options: &ImportOptions<'_>) -> Result<DeepnoteFile> {
    let document = NamedNotebook::new(file_name, parse_marimo(content)?);
    import_jupyter(&[document], options)
}

/// Export every notebook of `file` as a marimo app
///
/// # Errors
///
/// Propagates mapper failures from [`export_jupyter`].
pub fn export_marimo(
    file: &DeepnoteFile,
    options: &ExportOptions<'_>,
    marimo: &MarimoExportOptions,
) -> Result<Vec<ExportedScript>> {
    Ok(export_jupyter(file, options)?
        .into_iter()
        .map(|exported| ExportedScript {
            file_name: format!("{}.py", file_stem(&exported.file_name)),
            notebook_id: exported.notebook_id,
            content: render_marimo(&exported.notebook, marimo),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const APP: &str = r#"import marimo

__generated_with = "0.10.0"
app = marimo.App(width="medium", title="Data Analysis Example")


@app.cell
def __():
    import marimo as mo
    return mo,


@app.cell
def __(mo):
    mo.md(r"""
    # Data Analysis Example

    Intro.
    """)
    return


@app.cell(hide_code=True, disabled=True)
def __(df):
    if df.empty:
        print("empty")

    df.describe()
    return


if __name__ == "__main__":
    app.run()
"#;

    #[test]
    fn test_parse_cells() {
        let notebook = parse_marimo(APP).unwrap();
        assert_eq!(notebook.cells.len(), 3);
        assert_eq!(notebook.cells[0].source.to_text(), "import marimo as mo");

        let md = &notebook.cells[1];
        assert_eq!(md.cell_type, CellType::Markdown);
        assert_eq!(md.source.to_text(), "# Data Analysis Example\n\nIntro.");

        let code = &notebook.cells[2];
        assert_eq!(
            code.source.to_text(),
            "if df.empty:\n    print(\"empty\")\n\ndf.describe()"
        );
        assert_eq!(code.metadata.get("hide_code"), Some(&json!(true)));
        assert_eq!(code.metadata.get("disabled"), Some(&json!(true)));
    }

    #[test]
    fn test_title_names_notebook() {
        let notebook = parse_marimo(APP).unwrap();
        assert_eq!(
            notebook.metadata.get(NOTEBOOK_NAME),
            Some(&json!("Data Analysis Example"))
        );
    }

    #[test]
    fn test_decorator_without_def_fails() {
        let err = parse_marimo("import marimo\n@app.cell\nx = 1\n").unwrap_err();
        assert!(matches!(err, NotebridgeError::Parse { .. }));
    }

    #[test]
    fn test_render_adds_mo_import_only_when_needed() {
        let mut notebook = JupyterNotebook::new();
        notebook.cells.push(JupyterCell::markdown("# Hi"));
        let rendered = render_marimo(&notebook, &MarimoExportOptions::default());
        assert!(rendered.contains("    import marimo as mo\n    return mo,\n"));

        notebook.cells.insert(0, JupyterCell::code(MO_IMPORT));
        let rendered = render_marimo(&notebook, &MarimoExportOptions::default());
        assert_eq!(rendered.matches(MO_IMPORT).count(), 1);
    }

    #[test]
    fn test_render_then_parse_keeps_cells() {
        let original = parse_marimo(APP).unwrap();
        let rendered = render_marimo(&original, &MarimoExportOptions::default());
        let reparsed = parse_marimo(&rendered).unwrap();

        let texts = |n: &JupyterNotebook| -> Vec<(CellType, String)> {
            n.cells.iter().map(|c| (c.cell_type, c.source.to_text())).collect()
        };
        assert_eq!(texts(&reparsed), texts(&original));
        assert_eq!(reparsed.cells[2].metadata.get("hide_code"), Some(&json!(true)));
    }

    #[test]
    fn test_markdown_with_triple_quotes_survives() {
        let text = "Use \"\"\"docstrings\"\"\" and C:\\path";
        let mut notebook = JupyterNotebook::new();
        notebook.cells.push(JupyterCell::markdown(text));

        let rendered = render_marimo(&notebook, &MarimoExportOptions::default());
        let reparsed = parse_marimo(&rendered).unwrap();
        assert_eq!(reparsed.cells.len(), 2);
        assert_eq!(reparsed.cells[1].cell_type, CellType::Markdown);
        assert_eq!(reparsed.cells[1].source.to_text(), text);
    }

    #[test]
    fn test_dedent_keeps_non_ascii_whitespace() {
        assert_eq!(dedent(&["\u{3000}見出し", " continued"]), "\u{3000}見出し\n continued");
        assert_eq!(dedent(&["    a", "  \u{3000}", "    b"]), "a\n\u{3000}\nb");
    }

    #[test]
    fn test_cjk_markdown_survives_export_and_import() {
        let mut notebook = JupyterNotebook::new();
        notebook.cells.push(JupyterCell::markdown("\u{3000}見出し\n continued"));

        let rendered = render_marimo(&notebook, &MarimoExportOptions::default());
        let parsed = parse_marimo(&rendered).unwrap();

        let markdown: Vec<_> = parsed
            .cells
            .iter()
            .filter(|c| c.cell_type == CellType::Markdown)
            .collect();
        assert_eq!(markdown.len(), 1);
        assert!(markdown[0].source.to_text().contains("見出し"));
        assert!(markdown[0].source.to_text().contains("continued"));
    }

    #[test]
    fn test_unquote_variants() {
        assert_eq!(unquote(r#"r"""a\n""""#).as_deref(), Some(r"a\n"));
        assert_eq!(unquote(r#""a\nb""#).as_deref(), Some("a\nb"));
        assert_eq!(unquote("'x'").as_deref(), Some("x"));
        assert_eq!(unquote("name"), None);
    }
}
