//! Notebook dialect detection.
//!
//! The extension decides the dialect when it is unambiguous. A `.py` file may
//! be a marimo app or a percent-delimited script, so its content is sniffed.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::errors::{NotebridgeError, Result};

/// Supported notebook dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotebookFormat {
    /// Canonical `.deepnote` project file
    Deepnote,
    /// Jupyter `.ipynb` JSON document
    Jupyter,
    /// marimo cell-decorated Python script
    Marimo,
    /// `# %%` percent-delimited Python script
    Percent,
    /// Quarto markdown document with fenced code chunks
    Quarto,
}

impl NotebookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotebookFormat::Deepnote => "deepnote",
            NotebookFormat::Jupyter => "jupyter",
            NotebookFormat::Marimo => "marimo",
            NotebookFormat::Percent => "percent",
            NotebookFormat::Quarto => "quarto",
        }
    }

    /// File extension written for this dialect
    pub fn extension(&self) -> &'static str {
        match self {
            NotebookFormat::Deepnote => "deepnote",
            NotebookFormat::Jupyter => "ipynb",
            NotebookFormat::Marimo | NotebookFormat::Percent => "py",
            NotebookFormat::Quarto => "qmd",
        }
    }
}

impl std::fmt::Display for NotebookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn marimo_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^import\s+marimo(\s|$|\s+as\s)").expect("static regex"))
}

fn marimo_cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^@app\.cell\b").expect("static regex"))
}

fn percent_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^# %%").expect("static regex"))
}

/// Classify a file by name and, for `.py` files, by content
///
/// # Errors
///
/// - `NotebridgeError::MissingContent` if the extension needs sniffing and
///   `content` is `None`
/// - `NotebridgeError::UnsupportedFormat` if no dialect matches
pub fn detect_format(filename: &str, content: Option<&str>) -> Result<NotebookFormat> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("ipynb") => Ok(NotebookFormat::Jupyter),
        Some("deepnote") => Ok(NotebookFormat::Deepnote),
        Some("qmd") => Ok(NotebookFormat::Quarto),
        Some("py") => {
            let content = content.ok_or_else(|| NotebridgeError::MissingContent {
                filename: filename.to_string(),
            })?;
            sniff_python(content).ok_or_else(|| NotebridgeError::UnsupportedFormat {
                filename: filename.to_string(),
            })
        }
        _ => Err(NotebridgeError::UnsupportedFormat {
            filename: filename.to_string(),
        }),
    }
}

fn sniff_python(content: &str) -> Option<NotebookFormat> {
    if is_marimo(content) {
        return Some(NotebookFormat::Marimo);
    }
    if is_percent(content) {
        return Some(NotebookFormat::Percent);
    }
    None
}

/// marimo iff the first non-blank line is the import and a decorator exists
///
/// Checking the first line keeps a docstring that merely mentions
/// `import marimo` from qualifying.
fn is_marimo(content: &str) -> bool {
    let first_line = content.lines().map(str::trim_end).find(|l| !l.trim().is_empty());
    match first_line {
        Some(line) if marimo_import_re().is_match(line) => marimo_cell_re().is_match(content),
        _ => false,
    }
}

/// percent iff the first `# %%` marker precedes the first triple quote
fn is_percent(content: &str) -> bool {
    let Some(marker) = percent_marker_re().find(content) else {
        return false;
    };
    let first_triple_quote = ["\"\"\"", "'''"]
        .iter()
        .filter_map(|q| content.find(q))
        .min();
    match first_triple_quote {
        Some(quote_at) => marker.start() < quote_at,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_only_formats() {
        assert_eq!(detect_format("a.ipynb", None).unwrap(), NotebookFormat::Jupyter);
        assert_eq!(detect_format("A.IPYNB", None).unwrap(), NotebookFormat::Jupyter);
        assert_eq!(detect_format("p.deepnote", None).unwrap(), NotebookFormat::Deepnote);
        assert_eq!(detect_format("doc.qmd", None).unwrap(), NotebookFormat::Quarto);
    }

    #[test]
    fn test_python_requires_content() {
        let err = detect_format("script.py", None).unwrap_err();
        assert!(matches!(err, NotebridgeError::MissingContent { .. }));
    }

    #[test]
    fn test_unknown_extension() {
        let err = detect_format("notes.txt", Some("hello")).unwrap_err();
        assert!(matches!(err, NotebridgeError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_marimo_detected() {
        let content = "import marimo\n\napp = marimo.App()\n\n@app.cell\ndef __():\n    return\n";
        assert_eq!(detect_format("app.py", Some(content)).unwrap(), NotebookFormat::Marimo);
    }

    #[test]
    fn test_marimo_import_without_cells_is_not_marimo() {
        let content = "import marimo\nprint('no cells')\n";
        assert!(detect_format("app.py", Some(content)).is_err());
    }

    #[test]
    fn test_marimo_mentioned_in_docstring_is_not_marimo() {
        let content = "\"\"\"\nimport marimo\n\"\"\"\n@app.cell\ndef f():\n    pass\n";
        assert!(detect_format("app.py", Some(content)).is_err());
    }

    #[test]
    fn test_percent_detected() {
        let content = "# %% [markdown]\n# Title\n\n# %%\nx = 1\n";
        assert_eq!(detect_format("nb.py", Some(content)).unwrap(), NotebookFormat::Percent);
    }

    #[test]
    fn test_percent_marker_inside_string_is_ignored() {
        let content = "doc = \"\"\"\n# %%\n\"\"\"\nprint(doc)\n";
        assert!(detect_format("nb.py", Some(content)).is_err());
    }

    #[test]
    fn test_percent_marker_before_docstring() {
        let content = "# %%\ndef f():\n    \"\"\"Doc.\"\"\"\n";
        assert_eq!(detect_format("nb.py", Some(content)).unwrap(), NotebookFormat::Percent);
    }
}
