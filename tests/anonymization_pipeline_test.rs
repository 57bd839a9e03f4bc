//! End-to-end tests for the anonymization pipeline

use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use shroud::anonymization::anonymizer::generalization::OTHER_LABEL;
use shroud::anonymization::{
    AnonymizationConfig, AnonymizationEngine, SessionPseudonyms, SkipReason, Stage,
};
use shroud::domain::{ShroudError, Table, Value};
use std::collections::{HashMap, HashSet};

fn patients() -> Table {
    serde_json::from_value(json!([
        {"id": 1, "age": 28, "salary": 55000, "disease": "Diabetes"},
        {"id": 2, "age": 35, "salary": 72000, "disease": "Asthma"},
        {"id": 3, "age": 42, "salary": 89000, "disease": "Hypertension"},
        {"id": 4, "age": 28, "salary": 56000, "disease": "Diabetes"},
        {"id": 5, "age": 35, "salary": 73000, "disease": "None"},
        {"id": 6, "age": 42, "salary": 91000, "disease": "Asthma"},
        {"id": 7, "age": 50, "salary": 105000, "disease": "Diabetes"},
        {"id": 8, "age": 28, "salary": 57000, "disease": "None"}
    ]))
    .unwrap()
}

fn full_job() -> AnonymizationConfig {
    AnonymizationConfig::from_json_str(
        r#"{
            "name": "patients",
            "column_mappings": [
                {"column": "id", "type": "identifier"},
                {"column": "age", "type": "quasi-identifier"},
                {"column": "salary", "type": "quasi-identifier"},
                {"column": "disease", "type": "sensitive"}
            ],
            "techniques": [
                {"column": "age", "technique": "generalization", "params": {"bins": 3}},
                {"column": "salary", "technique": "generalization", "params": {"bins": 4}},
                {"column": "disease", "technique": "suppression", "params": {"threshold": 0.3}}
            ],
            "global_params": {"k": 2, "l": 2}
        }"#,
    )
    .unwrap()
}

fn is_range_or_overflow(value: &Value) -> bool {
    match value.as_str() {
        Some(text) => text.contains('-') || text == OTHER_LABEL,
        None => false,
    }
}

#[test]
fn test_full_pipeline() {
    let table = patients();
    let outcome = AnonymizationEngine::with_seed(Some(11))
        .run(&table, &full_job())
        .unwrap();

    assert!(!outcome.table.has_column("id"));
    assert_eq!(outcome.table.len(), 8);

    let ages = outcome.table.column("age").unwrap();
    assert_eq!(ages[0], Value::text("28-35"));
    assert!(ages.iter().all(is_range_or_overflow));

    let salaries = outcome.table.column("salary").unwrap();
    assert_eq!(salaries[0], Value::text("55000-67500"));
    assert!(salaries.iter().all(is_range_or_overflow));

    let suppressed = outcome
        .table
        .column("disease")
        .unwrap()
        .iter()
        .filter(|v| v.as_str() == Some("*"))
        .count();
    assert_eq!(suppressed, 2);

    let keys: Vec<&str> = outcome.details.keys().collect();
    assert_eq!(
        keys,
        vec![
            "identifier_id",
            "generalization_age",
            "generalization_salary",
            "suppression_disease",
            "k_anonymity",
            "l_diversity",
        ]
    );

    assert_eq!(
        outcome.stages,
        vec![
            Stage::DropIdentifiers,
            Stage::ApplyTechniques,
            Stage::KAnonymity { k: 2 },
            Stage::LDiversity {
                l: 2,
                column: "disease".to_string()
            },
            Stage::NoChangesSentinel,
        ]
    );
}

#[test]
fn test_k_anonymity_pass_overwrites_technique_output() {
    let outcome = AnonymizationEngine::with_seed(Some(3))
        .run(&patients(), &full_job())
        .unwrap();

    // age had three ranges after generalization; the pass keeps two
    let age_detail = outcome.details.get("generalization_age").unwrap();
    assert_eq!(age_detail.range_mapping.as_ref().map(Vec::len), Some(3));
    let ages: HashSet<&Value> = outcome.table.column("age").unwrap().iter().collect();
    assert_eq!(ages.len(), 3);
    assert!(ages.contains(&Value::text(OTHER_LABEL)));

    let k_detail = outcome.details.get("k_anonymity").unwrap();
    assert_eq!(k_detail.target_k, Some(2));
    assert_eq!(
        k_detail.quasi_identifiers.as_deref(),
        Some(&["age".to_string(), "salary".to_string()][..])
    );
}

#[test]
fn test_no_changes_only_when_nothing_applies() {
    let table = patients();
    let job = AnonymizationConfig::from_json_str(
        r#"{"techniques": [], "global_params": {"k": 1, "l": 1}}"#,
    )
    .unwrap();

    let outcome = AnonymizationEngine::new().run(&table, &job).unwrap();

    assert_eq!(outcome.table, table);
    assert_eq!(outcome.details.keys().collect::<Vec<_>>(), vec!["no_changes"]);
}

#[test]
fn test_masking_scenario() {
    let table: Table = serde_json::from_value(json!([
        {"phone": "612345678", "email": "juan.perez@email.com"},
        {"phone": "698765432", "email": "maria@email.com"}
    ]))
    .unwrap();
    let job = AnonymizationConfig::from_json_str(
        r#"{
            "techniques": [
                {"column": "phone", "technique": "masking", "params": {"mask_type": "phone"}},
                {"column": "email", "technique": "masking", "params": {"mask_type": "email"}}
            ]
        }"#,
    )
    .unwrap();

    let outcome = AnonymizationEngine::new().run(&table, &job).unwrap();

    assert_eq!(outcome.table.cell("phone", 0), Some(&Value::text("*****5678")));
    assert_eq!(
        outcome.table.cell("email", 0),
        Some(&Value::text("j*********@email.com"))
    );
    assert!(outcome.details.contains_key("masking_phone"));
    assert!(outcome.details.contains_key("masking_email"));
}

#[test]
fn test_unknown_techniques_and_columns_are_skipped() {
    let job = AnonymizationConfig::from_json_str(
        r#"{
            "techniques": [
                {"column": "nickname", "technique": "masking"},
                {"column": "age", "technique": "tokenization"},
                {"column": "salary", "technique": "differential_privacy", "params": {"epsilon": 2.0}}
            ]
        }"#,
    )
    .unwrap();

    let outcome = AnonymizationEngine::with_seed(Some(5))
        .run(&patients(), &job)
        .unwrap();

    let reasons: Vec<(&str, SkipReason)> = outcome
        .skipped
        .iter()
        .map(|s| (s.column.as_str(), s.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("nickname", SkipReason::ColumnNotFound),
            ("age", SkipReason::UnrecognizedTechnique),
        ]
    );
    assert_eq!(outcome.table.column("age"), patients().column("age"));
    assert!(outcome.details.contains_key("differential_privacy_salary"));
}

#[test]
fn test_technique_on_dropped_identifier_is_skipped() {
    let job = AnonymizationConfig::from_json_str(
        r#"{
            "column_mappings": [{"column": "id", "type": "identifier"}],
            "techniques": [{"column": "id", "technique": "pseudonymization"}]
        }"#,
    )
    .unwrap();

    let outcome = AnonymizationEngine::new().run(&patients(), &job).unwrap();

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, SkipReason::ColumnNotFound);
    assert!(!outcome.details.contains_key("pseudonymization_id"));
}

#[test]
fn test_missing_sensitive_column_is_reported_without_failing() {
    let table: Table = serde_json::from_value(json!([
        {"age": 28, "disease": "Flu"},
        {"age": 35, "disease": "Asthma"},
        {"age": 42, "disease": "Flu"},
        {"age": 50, "disease": "Gout"}
    ]))
    .unwrap();
    let job = AnonymizationConfig::from_json_str(
        r#"{
            "column_mappings": [
                {"column": "age", "type": "quasi-identifier"},
                {"column": "diagnosis", "type": "sensitive"}
            ],
            "global_params": {"k": 2, "l": 2}
        }"#,
    )
    .unwrap();

    let result = AnonymizationEngine::new().process(&table, &job).unwrap();

    let keys: Vec<&str> = result.technique_details.keys().collect();
    assert_eq!(keys, vec!["k_anonymity", "l_diversity"]);
    let l_detail = result.technique_details.get("l_diversity").unwrap();
    assert!(l_detail.error.as_deref().unwrap().contains("diagnosis"));
    assert_eq!(l_detail.sensitive_attribute.as_deref(), Some("diagnosis"));
    assert!(l_detail.achieved_l.is_none());

    assert!(result.metrics.sensitive_attributes.is_empty());
    assert_eq!(result.metrics.achieved_l, 0.0);
}

#[test]
fn test_invalid_parameter_aborts_run() {
    let mut job = full_job();
    job.techniques[2] = job.techniques[2].clone().param("threshold", 1.5);

    let result = AnonymizationEngine::new().run(&patients(), &job);

    assert!(matches!(result, Err(ShroudError::InvalidParameter { .. })));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let engine = AnonymizationEngine::with_seed(Some(99));
    let first = engine.run(&patients(), &full_job()).unwrap();
    let second = engine.run(&patients(), &full_job()).unwrap();
    assert_eq!(first.table, second.table);
}

#[test]
fn test_pseudonymization_is_a_bijection() {
    let mut rng = StdRng::seed_from_u64(2024);
    let names: Vec<String> = (0..12).map(|_| Name().fake_with_rng(&mut rng)).collect();
    // Repeat every name so consistency is exercised
    let column: Vec<serde_json::Value> = names
        .iter()
        .chain(names.iter())
        .map(|n| json!({"name": n}))
        .collect();
    let table: Table = serde_json::from_value(serde_json::Value::Array(column)).unwrap();
    let job = AnonymizationConfig::from_json_str(
        r#"{"techniques": [{"column": "name", "technique": "pseudonymization", "params": {"prefix": "P"}}]}"#,
    )
    .unwrap();

    let outcome = AnonymizationEngine::new().run(&table, &job).unwrap();

    let before = table.column("name").unwrap();
    let after = outcome.table.column("name").unwrap();
    let mut forward: HashMap<&Value, &Value> = HashMap::new();
    let mut backward: HashMap<&Value, &Value> = HashMap::new();
    for (original, pseudonym) in before.iter().zip(after) {
        assert!(pseudonym.as_str().unwrap().starts_with("P_"));
        assert_eq!(*forward.entry(original).or_insert(pseudonym), pseudonym);
        assert_eq!(*backward.entry(pseudonym).or_insert(original), original);
    }
}

#[test]
fn test_shared_store_keeps_pseudonyms_across_runs() {
    let table: Table = serde_json::from_value(json!([{"name": "Ana"}, {"name": "Luis"}])).unwrap();
    let job = AnonymizationConfig::from_json_str(
        r#"{"techniques": [{"column": "name", "technique": "pseudonymization"}]}"#,
    )
    .unwrap();
    let engine = AnonymizationEngine::new();
    let mut store = SessionPseudonyms::new();

    let first = engine.run_with_store(&table, &job, &mut store).unwrap();
    let reversed: Table = serde_json::from_value(json!([{"name": "Luis"}, {"name": "Ana"}])).unwrap();
    let second = engine.run_with_store(&reversed, &job, &mut store).unwrap();

    assert_eq!(first.table.cell("name", 0), second.table.cell("name", 1));
    assert_eq!(first.table.cell("name", 1), second.table.cell("name", 0));
}

#[test]
fn test_processing_result_serializes_rows() {
    let result = AnonymizationEngine::with_seed(Some(1))
        .process(&patients(), &full_job())
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    let rows = json["anonymized"].as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert!(rows[0].get("id").is_none());
    assert_eq!(json["metrics"]["original_columns"], 4);
    assert_eq!(json["metrics"]["anonymized_columns"], 3);
    assert!(json["technique_details"]["k_anonymity"]["explanation"]
        .as_str()
        .unwrap()
        .contains("Target K: 2"));
}
