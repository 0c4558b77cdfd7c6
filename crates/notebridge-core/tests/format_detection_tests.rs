use notebridge_core::errors::{ExError, ExErrorKind};
use notebridge_core::{detect_format, NotebookFormat, NotebridgeError};

#[test]
fn test_detection_is_extension_driven_for_unambiguous_files() {
    let cases = [
        ("analysis.ipynb", NotebookFormat::Jupyter),
        ("project.deepnote", NotebookFormat::Deepnote),
        ("report.qmd", NotebookFormat::Quarto),
        ("dir/nested/Report.QMD", NotebookFormat::Quarto),
    ];
    for (name, expected) in cases {
        assert_eq!(detect_format(name, None).unwrap(), expected, "for {}", name);
    }
}

#[test]
fn test_python_without_content_maps_to_missing_content_code() {
    let err = detect_format("script.py", None).unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::MissingContent);
    assert_eq!(ex.code(), "ERR_MISSING_CONTENT");
    assert_eq!(ex.path(), Some("script.py"));
}

#[test]
fn test_plain_python_is_unsupported() {
    let err = detect_format("tool.py", Some("def main():\n    pass\n")).unwrap_err();
    assert!(matches!(err, NotebridgeError::UnsupportedFormat { ref filename } if filename == "tool.py"));
}

#[test]
fn test_marimo_with_leading_blank_lines() {
    let content = "\n\nimport marimo\napp = marimo.App()\n\n@app.cell\ndef _():\n    return\n";
    assert_eq!(detect_format("a.py", Some(content)).unwrap(), NotebookFormat::Marimo);
}

#[test]
fn test_marimo_takes_precedence_over_percent_markers() {
    let content = "import marimo\n# %%\n@app.cell\ndef _():\n    return\n";
    assert_eq!(detect_format("a.py", Some(content)).unwrap(), NotebookFormat::Marimo);
}

#[test]
fn test_detection_is_deterministic() {
    let content = "# %%\nx = 1\n";
    let first = detect_format("n.py", Some(content)).unwrap();
    for _ in 0..10 {
        assert_eq!(detect_format("n.py", Some(content)).unwrap(), first);
    }
}

#[test]
fn test_format_extensions() {
    assert_eq!(NotebookFormat::Jupyter.extension(), "ipynb");
    assert_eq!(NotebookFormat::Marimo.extension(), "py");
    assert_eq!(NotebookFormat::Percent.to_string(), "percent");
}
