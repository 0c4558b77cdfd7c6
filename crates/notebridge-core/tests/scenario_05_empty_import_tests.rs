/// Scenario 5: Importing nothing yields an empty project
use notebridge_core::{import_jupyter, ImportOptions, SequentialIdGenerator};

#[test]
fn test_scenario_05_zero_documents_mint_fresh_project() {
    // GIVEN no documents
    let ids = SequentialIdGenerator::new("fresh");

    // WHEN importing
    let file = import_jupyter(&[], &ImportOptions::with_ids(&ids)).unwrap();

    // THEN the project is empty with a freshly minted id
    assert!(file.project.notebooks.is_empty());
    assert_eq!(file.project.id, "fresh-1");
    assert_eq!(file.project.name, "Untitled project");
}

#[test]
fn test_scenario_05_ids_differ_between_imports() {
    let first = import_jupyter(&[], &ImportOptions::default()).unwrap();
    let second = import_jupyter(&[], &ImportOptions::default()).unwrap();
    assert_ne!(first.project.id, second.project.id);
}

#[test]
fn test_scenario_05_explicit_name_applies_to_empty_import() {
    let file = import_jupyter(&[], &ImportOptions::default().project_name("Scratch")).unwrap();
    assert_eq!(file.project.name, "Scratch");
}
