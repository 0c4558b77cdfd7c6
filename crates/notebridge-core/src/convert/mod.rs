//! Conversion between canonical files and external notebook dialects.
//!
//! Jupyter is the hub: the script dialects parse into and render from
//! `JupyterNotebook` values, so identity, ordering and metadata rules live in
//! one mapper.

pub mod jupyter;
pub mod marimo;
pub mod metadata;
pub mod percent;
pub mod quarto;

use std::collections::HashSet;
use std::path::Path;

pub use jupyter::{
    export_jupyter, import_jupyter, parse_jupyter_str, to_jupyter_string, ExportOptions,
    ExportedNotebook, ImportOptions, NamedNotebook,
};
pub use marimo::{export_marimo, import_marimo, MarimoExportOptions};
pub use percent::{export_percent, import_percent};
pub use quarto::{export_quarto, import_quarto};

/// One exported text document
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedScript {
    pub file_name: String,
    pub notebook_id: String,
    pub content: String,
}

/// File name without directory or final extension
pub(crate) fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| name.to_string())
}

/// `<name>.<extension>` for each name, made filesystem-safe and unique
pub(crate) fn unique_file_names(names: &[&str], extension: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| {
            let base = sanitize_file_name(name);
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.to_lowercase()) {
                candidate = format!("{} ({})", base, n);
                n += 1;
            }
            format!("{}.{}", candidate, extension)
        })
        .collect()
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "Untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Insert `value` under `key` unless already present
pub(crate) fn set_default(
    map: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
    value: impl Into<serde_json::Value>,
) {
    if !map.contains_key(key) {
        map.insert(key.to_string(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("dir/analysis.ipynb"), "analysis");
        assert_eq!(file_stem("v1.2.py"), "v1.2");
        assert_eq!(file_stem("plain"), "plain");
    }

    #[test]
    fn test_unique_file_names() {
        let names = unique_file_names(&["Main", "a/b", "main", ""], "ipynb");
        assert_eq!(
            names,
            vec!["Main.ipynb", "a_b.ipynb", "main (2).ipynb", "Untitled.ipynb"]
        );
    }
}
