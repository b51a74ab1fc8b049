//! Tests for the CLI commands against on-disk databases.

#![allow(clippy::unwrap_used, clippy::panic)]

use arquimetro::cli::{cmd_export, cmd_import, cmd_init, cmd_report};
use arquimetro_core::{ArquimetroError, Catalog, CatalogStore, RedbStore, import_canonical};
use serde_json::json;

#[test]
fn test_init_seeds_default_categories_and_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("arquimetro.db");

    cmd_init(&db, false).unwrap();
    {
        let store = RedbStore::open(&db).unwrap();
        assert_eq!(store.list_categories().unwrap().len(), 5);
    }

    assert!(matches!(
        cmd_init(&db, false),
        Err(ArquimetroError::IoError(_))
    ));
    cmd_init(&db, true).unwrap();
}

#[test]
fn test_import_json_then_export_canonical() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("arquimetro.db");
    let input = dir.path().join("catalog.json");
    std::fs::write(
        &input,
        json!({
            "categories": [{"id": 1, "title": "Gestão"}],
            "subcategories": [{"id": 2, "title": "Classificação", "category_id": 1}],
            "questions": [{"id": 3, "text": "Existe plano?", "subcategory_id": 2}],
            "response_options": [
                {"id": 4, "question_id": 3, "level": 1, "label": "Não", "feedback": "Crie", "weight": 1},
                {"id": 5, "question_id": 3, "level": 5, "label": "Sim", "feedback": "Mantenha", "weight": 5}
            ]
        })
        .to_string(),
    )
    .unwrap();

    cmd_import(&db, &input).unwrap();

    let output = dir.path().join("catalog.arqx");
    cmd_export(&db, &output, "canonical").unwrap();
    let exported = import_canonical(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(exported.stats().response_options, 2);

    // A canonical export imports back as-is.
    let second_db = dir.path().join("copy.db");
    cmd_import(&second_db, &output).unwrap();
    let store = RedbStore::open(&second_db).unwrap();
    assert_eq!(store.snapshot().unwrap().to_parts(), exported.to_parts());
}

#[test]
fn test_import_rejects_invalid_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("arquimetro.db");
    let input = dir.path().join("catalog.json");
    std::fs::write(
        &input,
        json!({"questions": [{"id": 3, "text": "Órfã", "subcategory_id": 99}]}).to_string(),
    )
    .unwrap();

    assert!(cmd_import(&db, &input).is_err());
    assert!(cmd_import(&db, &dir.path().join("missing.json")).is_err());
}

#[test]
fn test_export_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("arquimetro.db");
    {
        let mut store = RedbStore::open(&db).unwrap();
        store
            .replace_catalog(Catalog::with_default_categories())
            .unwrap();
    }

    let result = cmd_export(&db, &dir.path().join("out.xml"), "xml");
    assert!(matches!(result, Err(ArquimetroError::SerializationError(_))));
}

#[test]
fn test_report_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("arquimetro.db");
    cmd_init(&db, false).unwrap();

    let output = dir.path().join("relatorio.txt");
    cmd_report(&db, "arquivo-central", Some(&output), "text").unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("arquivo-central"));
    assert!(text.contains("Em configuração"));
}
