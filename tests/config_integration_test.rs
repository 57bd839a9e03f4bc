//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use shroud::anonymization::{ColumnRole, TechniqueKind};
use shroud::config::{load_config, load_job};
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("SHROUD_APPLICATION_LOG_LEVEL");
    std::env::remove_var("SHROUD_ENGINE_SEED");
    std::env::remove_var("SHROUD_LOGGING_LOCAL_ENABLED");
    std::env::remove_var("SHROUD_LOGGING_LOCAL_PATH");
    std::env::remove_var("SHROUD_ANONYMIZATION_K");
    std::env::remove_var("SHROUD_ANONYMIZATION_L");
    std::env::remove_var("TEST_SHROUD_LOG_DIR");
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const COMPLETE_CONFIG: &str = r#"
[application]
log_level = "debug"

[engine]
seed = 1234

[logging]
local_enabled = true
local_path = "/tmp/shroud-logs"
local_rotation = "hourly"

[anonymization]
name = "patients"

[[anonymization.column_mappings]]
column = "id"
type = "identifier"

[[anonymization.column_mappings]]
column = "age"
type = "quasi-identifier"

[[anonymization.column_mappings]]
column = "disease"
type = "sensitive"

[[anonymization.techniques]]
column = "age"
technique = "generalization"
params = { bins = 3 }

[[anonymization.techniques]]
column = "disease"
technique = "suppression"
params = { threshold = 0.25 }

[anonymization.global_params]
k = 3
l = 2
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_temp(COMPLETE_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.engine.seed, Some(1234));
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    let job = config.anonymization.unwrap();
    assert_eq!(job.name.as_deref(), Some("patients"));
    assert_eq!(job.column_mappings[1].role, ColumnRole::QuasiIdentifier);
    assert_eq!(job.techniques[1].technique, TechniqueKind::Suppression);
    assert_eq!(job.global_params.k, 3);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_temp("[application]\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(config.engine.seed.is_none());
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "./logs");
    assert!(config.anonymization.is_none());
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("SHROUD_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("SHROUD_ENGINE_SEED", "7");
    std::env::set_var("SHROUD_ANONYMIZATION_K", "5");

    let file = write_temp(COMPLETE_CONFIG);
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.engine.seed, Some(7));
    assert_eq!(config.anonymization.unwrap().global_params.k, 5);
}

#[test]
fn test_invalid_seed_override_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("SHROUD_ENGINE_SEED", "not-a-number");
    let file = write_temp("[application]\n");
    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(result.is_err());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("TEST_SHROUD_LOG_DIR", "/var/log/shroud");
    let file = write_temp(
        r#"
# local_path = "${UNSET_IN_COMMENT}"
[logging]
local_enabled = true
local_path = "${TEST_SHROUD_LOG_DIR}"
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    assert_eq!(result.unwrap().logging.local_path, "/var/log/shroud");
}

#[test]
fn test_missing_env_var_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_temp("[logging]\nlocal_path = \"${TEST_SHROUD_LOG_DIR}\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_SHROUD_LOG_DIR"));
}

#[test]
fn test_invalid_log_level_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_temp("[application]\nlog_level = \"loud\"\n");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_invalid_technique_params_fail_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_temp(
        r#"
[[anonymization.techniques]]
column = "salary"
technique = "differential_privacy"
params = { epsilon = -1.0 }
"#,
    );
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_unknown_technique_is_accepted() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_temp(
        r#"{"techniques": [{"column": "name", "technique": "hashing", "params": {"rounds": "many"}}]}"#,
    );
    let job = load_job(file.path()).unwrap();
    assert_eq!(
        job.techniques[0].technique,
        TechniqueKind::Unrecognized("hashing".to_string())
    );
}

#[test]
fn test_load_job_with_env_override() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("SHROUD_ANONYMIZATION_L", "3");
    let file = write_temp(r#"{"global_params": {"k": 4}}"#);
    let result = load_job(file.path());
    cleanup_env_vars();

    let job = result.unwrap();
    assert_eq!(job.global_params.k, 4);
    assert_eq!(job.global_params.l, 3);
}
