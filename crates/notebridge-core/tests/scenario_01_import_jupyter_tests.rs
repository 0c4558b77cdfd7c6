/// Scenario 1: Import a plain Jupyter document
///
/// A document with no propagated metadata becomes one notebook whose blocks
/// get fresh identity, increasing sorting keys and a project named after the
/// file.
mod common;

use notebridge_core::model::{BlockType, JupyterCell, JupyterNotebook};
use notebridge_core::{import_jupyter, parse_jupyter_str, NamedNotebook, SequentialIdGenerator};

#[test]
fn test_scenario_01_two_cells_become_two_blocks() {
    // GIVEN a document with a markdown and a code cell
    let mut document = JupyterNotebook::new();
    document.cells.push(JupyterCell::markdown("# Test Notebook"));
    document.cells.push(JupyterCell::code("print(\"hello\")"));

    // WHEN importing it without an explicit project name
    let ids = SequentialIdGenerator::new("test");
    let file = import_jupyter(
        &[NamedNotebook::new("my-notebook.ipynb", document)],
        &common::sequential_options(&ids),
    )
    .expect("import should succeed");

    // THEN one notebook with two blocks exists
    assert_eq!(file.project.notebooks.len(), 1);
    let blocks = &file.project.notebooks[0].blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].block_type, BlockType::Markdown);
    assert_eq!(blocks[1].block_type, BlockType::Code);
    assert_eq!(blocks[0].content, "# Test Notebook");
    assert_eq!(blocks[1].content, "print(\"hello\")");

    // AND sorting keys strictly increase
    assert!(blocks[0].sorting_key < blocks[1].sorting_key);

    // AND the project is named after the file
    assert_eq!(file.project.name, "my-notebook");
}

#[test]
fn test_scenario_01_each_cell_gets_its_own_group() {
    let mut document = JupyterNotebook::new();
    document.cells.push(JupyterCell::code("a = 1"));
    document.cells.push(JupyterCell::code("b = 2"));

    let ids = SequentialIdGenerator::new("test");
    let file = import_jupyter(
        &[NamedNotebook::new("groups.ipynb", document)],
        &common::sequential_options(&ids),
    )
    .unwrap();

    let blocks = &file.project.notebooks[0].blocks;
    assert_ne!(blocks[0].id, blocks[1].id);
    assert_ne!(blocks[0].block_group, blocks[1].block_group);
}

#[test]
fn test_scenario_01_parses_line_list_sources_and_outputs() {
    // GIVEN an nbformat document as Jupyter writes it
    let text = r#"{
 "cells": [
  {
   "cell_type": "code",
   "execution_count": 7,
   "id": "abc",
   "metadata": {"collapsed": true},
   "outputs": [{"output_type": "stream", "name": "stdout", "text": ["hi\n"]}],
   "source": ["x = 1\n", "print(x)"]
  }
 ],
 "metadata": {"kernelspec": {"name": "python3"}},
 "nbformat": 4,
 "nbformat_minor": 5
}"#;
    let document = parse_jupyter_str(text).unwrap();

    // WHEN importing it
    let file = import_jupyter(
        &[NamedNotebook::new("run.ipynb", document)],
        &Default::default(),
    )
    .unwrap();

    // THEN source, execution state and extra metadata are carried over
    let block = &file.project.notebooks[0].blocks[0];
    assert_eq!(block.content, "x = 1\nprint(x)");
    assert_eq!(block.execution_count, Some(7));
    assert!(block.has_outputs());
    assert_eq!(block.metadata.get_bool("collapsed"), Some(true));
}

#[test]
fn test_scenario_01_empty_document_gives_empty_notebook() {
    let file = import_jupyter(
        &[NamedNotebook::new("empty.ipynb", JupyterNotebook::new())],
        &Default::default(),
    )
    .unwrap();
    assert_eq!(file.project.notebooks.len(), 1);
    assert!(file.project.notebooks[0].blocks.is_empty());
    assert_eq!(file.project.notebooks[0].name, "empty");
}
