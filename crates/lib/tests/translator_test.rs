//! # Translator Tests
//!
//! Covers schema rendering, prompt construction, and the lenient parsing of the
//! model's three-section reply.

mod common;

use crate::common::{
    model_reply, products_schema, setup_tracing, FailingAiProvider, MockAiProvider,
};
use askdb::{
    translator::{format_schema, parse_response},
    ColumnSchema, FailureKind, GeneratedQuery, QueryError, SchemaCatalog, TableSchema, Translator,
};
use serde_json::json;

#[test]
fn test_format_schema_renders_tables_in_name_order() {
    let schema = SchemaCatalog::new()
        .with_table(TableSchema::new(
            "Products",
            vec![
                ColumnSchema::new("id", "INTEGER").primary_key(),
                ColumnSchema::new("name", "TEXT"),
            ],
        ))
        .with_table(TableSchema::new(
            "Categories",
            vec![ColumnSchema::new("title", "VARCHAR(64)")],
        ));

    let rendered = format_schema(&schema);

    assert_eq!(
        rendered,
        "Table: Categories\nColumns: title (VARCHAR(64))\n\n\
         Table: Products\nColumns: id (INTEGER) (PRIMARY KEY), name (TEXT)"
    );
}

#[test]
fn test_format_schema_includes_at_most_three_sample_rows() {
    let rows = (1..=5)
        .map(|i| match json!({ "id": i }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        })
        .collect();
    let schema = SchemaCatalog::new().with_table(
        TableSchema::new("Products", vec![ColumnSchema::new("id", "INTEGER")])
            .with_sample_rows(rows),
    );

    let rendered = format_schema(&schema);

    assert!(rendered.ends_with("Sample rows: {\"id\":1}, {\"id\":2}, {\"id\":3}"));
    assert!(!rendered.contains("{\"id\":4}"));
}

#[test]
fn test_parse_response_extracts_all_sections() {
    let reply = model_reply(
        "Lists every product.",
        "SELECT id, name, price FROM Products",
        "Products, Categories ,",
    );

    let parsed = parse_response(&reply);

    assert_eq!(parsed.sql, "SELECT id, name, price FROM Products");
    assert_eq!(parsed.explanation, "Lists every product.");
    assert_eq!(parsed.relevant_tables, vec!["Products", "Categories"]);
}

#[test]
fn test_parse_response_tolerates_missing_sections() {
    let only_explanation = parse_response("```explanation\nI cannot answer that.\n```");
    assert_eq!(only_explanation.sql, "");
    assert_eq!(only_explanation.explanation, "I cannot answer that.");
    assert!(only_explanation.relevant_tables.is_empty());
    assert!(!only_explanation.has_sql());

    let empty = parse_response("");
    assert_eq!(empty, GeneratedQuery::default());

    let free_text = parse_response("SELECT * FROM Products");
    assert!(
        !free_text.has_sql(),
        "unfenced text must not be treated as a query"
    );
}

#[test]
fn test_parse_response_keeps_first_section_and_ignores_other_labels() {
    let reply = "Here you go:\n```json\n{\"a\": 1}\n```\n```SQL\nSELECT 1\n```\n```sql\nSELECT 2\n```\n```tables\n\n```";

    let parsed = parse_response(reply);

    assert_eq!(parsed.sql, "SELECT 1");
    assert!(parsed.relevant_tables.is_empty());
}

#[tokio::test]
async fn test_generate_sends_schema_and_question_to_model() {
    setup_tracing();
    let mock = MockAiProvider::new(vec![model_reply(
        "Selects all products.",
        "SELECT * FROM Products",
        "Products",
    )]);
    let history = mock.call_history.clone();
    let translator = Translator::new(Box::new(mock));

    let generated = translator
        .generate("list all products", &products_schema())
        .await
        .expect("translation should succeed");

    assert_eq!(generated.sql, "SELECT * FROM Products");
    assert_eq!(generated.relevant_tables, vec!["Products"]);

    let history = history.read().unwrap();
    assert_eq!(history.len(), 1, "expected exactly one model call");
    let (_system_prompt, user_prompt) = &history[0];
    assert!(user_prompt.contains(
        "Table: Products\nColumns: id (INTEGER) (PRIMARY KEY), name (TEXT), price (REAL)"
    ));
    assert!(user_prompt.contains("# User question\nlist all products"));
    assert!(user_prompt.contains("LEFT JOIN"));
    assert!(user_prompt.contains("```tables"));
}

#[tokio::test]
async fn test_generate_with_custom_prompts() {
    let mock = MockAiProvider::new(vec![String::new()]);
    let history = mock.call_history.clone();
    let translator = Translator::new(Box::new(mock)).with_prompts(
        "custom system".to_string(),
        "Q={question}\nS={schema}".to_string(),
    );

    let generated = translator
        .generate("how many?", &products_schema())
        .await
        .unwrap();

    assert!(!generated.has_sql());
    let history = history.read().unwrap();
    assert_eq!(history[0].0, "custom system");
    assert!(history[0].1.starts_with("Q=how many?\nS=Table: Products"));
}

#[tokio::test]
async fn test_generate_rejects_empty_schema_without_calling_model() {
    let mock = MockAiProvider::new(vec![]);
    let translator = Translator::new(Box::new(mock.clone()));

    let err = translator
        .generate("list all products", &SchemaCatalog::new())
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::EmptySchema));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_generate_rejects_blank_question_without_calling_model() {
    let mock = MockAiProvider::new(vec![]);
    let translator = Translator::new(Box::new(mock.clone()));

    let err = translator
        .generate("   ", &products_schema())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::InvalidRequest);
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_generate_surfaces_model_failure_as_translation_unavailable() {
    let translator = Translator::new(Box::new(FailingAiProvider));

    let err = translator
        .generate("list all products", &products_schema())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::TranslationUnavailable);
    assert!(err.kind().is_retryable());
}
