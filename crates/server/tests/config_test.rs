//! # Configuration Tests
//!
//! Exercises the layered loading in `get_config`: YAML file, `${VAR}`
//! substitution, built-in task defaults, `prompt.yml` overrides and
//! environment overrides.

use askdb_server::config::{get_config, ConfigError, QUERY_TRANSLATION_TASK};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::{tempdir, TempDir};

// Environment variables are process-global, so tests that touch them run one at a time.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env_vars() {
    for var in [
        "AI_PROVIDER",
        "PORT",
        "QUERY_TIMEOUT_SECS",
        "TEST_LOCAL_AI_URL",
        "ASKDB_PROVIDERS__DEFAULT__MODEL_NAME",
        "ASKDB_QUERY_TIMEOUT_SECS",
    ] {
        env::remove_var(var);
    }
}

const BASE_CONFIG: &str = r#"
providers:
  default:
    provider: "local"
    api_url: "${TEST_LOCAL_AI_URL}"
    api_key: null
    model_name: "test-model"
"#;

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn test_defaults_and_env_substitution() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("TEST_LOCAL_AI_URL", "http://localhost:1234/v1/chat/completions");

    let (_dir, path) = write_config(BASE_CONFIG);
    let config = get_config(Some(path.to_str().unwrap())).expect("config should load");

    assert_eq!(config.port, 9090);
    assert_eq!(config.query_timeout_secs, 30);
    let provider = &config.providers["default"];
    assert_eq!(provider.provider, "local");
    assert_eq!(
        provider.api_url.as_deref(),
        Some("http://localhost:1234/v1/chat/completions")
    );

    let task = &config.tasks[QUERY_TRANSLATION_TASK];
    assert_eq!(task.provider.as_deref(), Some("default"));
    assert!(task
        .user_prompt
        .as_deref()
        .is_some_and(|p| p.contains("{schema}") && p.contains("{question}")));

    clear_env_vars();
}

#[test]
fn test_top_level_env_overrides() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("PORT", "9999");
    env::set_var("QUERY_TIMEOUT_SECS", "5");

    let (_dir, path) = write_config(&format!("port: 8080\nquery_timeout_secs: 60\n{BASE_CONFIG}"));
    let config = get_config(Some(path.to_str().unwrap())).expect("config should load");

    assert_eq!(config.port, 9999);
    assert_eq!(config.query_timeout_secs, 5);

    clear_env_vars();
}

#[test]
fn test_prefixed_env_overrides_nested_keys() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("ASKDB_PROVIDERS__DEFAULT__MODEL_NAME", "override-model");

    let (_dir, path) = write_config(BASE_CONFIG);
    let config = get_config(Some(path.to_str().unwrap())).expect("config should load");

    assert_eq!(config.providers["default"].model_name, "override-model");

    clear_env_vars();
}

#[test]
fn test_prompt_file_overrides_task_prompts() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let (dir, path) = write_config(BASE_CONFIG);
    fs::write(
        dir.path().join("prompt.yml"),
        "tasks:\n  query_translation:\n    system_prompt: \"You write SQLite.\"\n",
    )
    .unwrap();

    let config = get_config(Some(path.to_str().unwrap())).expect("config should load");
    let task = &config.tasks[QUERY_TRANSLATION_TASK];

    assert_eq!(task.system_prompt.as_deref(), Some("You write SQLite."));
    // Untouched keys keep the built-in values.
    assert_eq!(task.provider.as_deref(), Some("default"));
    assert!(task.user_prompt.is_some());

    clear_env_vars();
}

#[test]
fn test_invalid_port_is_rejected() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("PORT", "not-a-number");

    let (_dir, path) = write_config(BASE_CONFIG);
    let result = get_config(Some(path.to_str().unwrap()));

    assert!(matches!(result, Err(ConfigError::General(_))));

    clear_env_vars();
}

#[test]
fn test_missing_config_file_is_not_found() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.yml");
    let result = get_config(Some(missing.to_str().unwrap()));

    assert!(matches!(result, Err(ConfigError::NotFound(_))));

    clear_env_vars();
}
