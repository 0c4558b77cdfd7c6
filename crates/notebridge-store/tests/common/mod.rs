use notebridge_core::model::{Block, BlockType, DeepnoteFile, Notebook};
use serde_json::json;

/// Project with one executed code block and one markdown block
#[allow(dead_code)]
pub fn executed_project() -> DeepnoteFile {
    let mut file = DeepnoteFile::empty("project-1", "Sales Analysis");
    file.environment = Some(json!({"python": "3.11"}));

    let mut notebook = Notebook::new("nb-main", "Main");
    let mut code = Block::new("b-code", BlockType::Code, "print(42)", "g-1", "000000");
    code.execution_count = Some(1);
    code.outputs = Some(vec![json!({"output_type": "stream", "name": "stdout", "text": "42\n"})]);
    code.execution_started_at = Some("2025-03-01T10:00:00.000Z".to_string());
    code.execution_finished_at = Some("2025-03-01T10:00:01.000Z".to_string());
    notebook.blocks.push(code);
    notebook
        .blocks
        .push(Block::new("b-notes", BlockType::Markdown, "# Notes", "g-2", "000001"));

    file.project.notebooks.push(notebook);
    file
}

/// Outputs of the block with `id`, if any
#[allow(dead_code)]
pub fn outputs_of(file: &DeepnoteFile, id: &str) -> Option<Vec<serde_json::Value>> {
    file.blocks().find(|b| b.id == id).and_then(|b| b.outputs.clone())
}
