use notebridge_core::model::{Block, BlockType, DeepnoteFile, Notebook};
use notebridge_core::{ImportOptions, NamedNotebook, SequentialIdGenerator};
use serde_json::json;

/// Two-notebook project mixing code, SQL, inputs and text blocks
#[allow(dead_code)]
pub fn sample_project() -> DeepnoteFile {
    let mut file = DeepnoteFile::empty("project-1", "Sales Analysis");
    file.project.integrations = vec![json!({"id": "pg-1", "type": "pgsql", "name": "Warehouse"})];
    file.project.settings.set("requirements", json!(["pandas"]));
    file.project.init_notebook_id = Some("nb-init".to_string());

    let mut main = Notebook::new("nb-main", "Main");
    main.blocks.push(block("b-title", BlockType::TextCellH1, "Quarterly report", 0));

    let mut input = block("b-input", BlockType::InputText, "", 1);
    input.metadata.set("deepnote_variable_name", json!("region"));
    input.metadata.set("deepnote_variable_value", json!("EMEA"));
    main.blocks.push(input);

    let mut sql = block("b-sql", BlockType::Sql, "SELECT * FROM sales", 2);
    sql.metadata.set("deepnote_variable_name", json!("sales"));
    sql.metadata.set("sql_integration_id", json!("pg-1"));
    main.blocks.push(sql);

    let mut code = block("b-code", BlockType::Code, "sales.describe()", 3);
    code.execution_count = Some(2);
    code.outputs = Some(vec![json!({
        "output_type": "execute_result",
        "data": {"text/plain": "count 10"},
        "metadata": {},
        "execution_count": 2
    })]);
    code.execution_started_at = Some("2025-03-01T10:00:00.000Z".to_string());
    code.execution_finished_at = Some("2025-03-01T10:00:01.000Z".to_string());
    main.blocks.push(code);

    main.blocks.push(block("b-notes", BlockType::Markdown, "Some *notes*.", 4));

    let mut init = Notebook::new("nb-init", "Init");
    init.is_module = true;
    init.blocks.push(block("b-init", BlockType::Code, "import pandas as pd", 0));

    file.project.notebooks.push(main);
    file.project.notebooks.push(init);
    file
}

/// Block with key derived from `position` and group `g-<id>`
#[allow(dead_code)]
pub fn block(id: &str, block_type: BlockType, content: &str, position: u64) -> Block {
    let key = notebridge_core::sorting_key_for(position).unwrap();
    Block::new(id, block_type, content, format!("g-{}", id), key)
}

/// Re-wrap exported documents as import input
#[allow(dead_code)]
pub fn as_documents(exported: Vec<notebridge_core::ExportedNotebook>) -> Vec<NamedNotebook> {
    exported
        .into_iter()
        .map(|e| NamedNotebook::new(e.file_name, e.notebook))
        .collect()
}

/// Import options minting `test-<n>` ids
#[allow(dead_code)]
pub fn sequential_options(ids: &SequentialIdGenerator) -> ImportOptions<'_> {
    ImportOptions::with_ids(ids)
}
