//! Unit tests for configuration loading and graceful degradation
//!
//! Tests:
//! - Missing TOML file → warning + defaults
//! - Config path priority (CLI → ENV → default file name)
//! - Malformed TOML is reported, not ignored
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate BGG_CONFIG are marked with #[serial].

use bgg_common::config::{
    load_toml_config, resolve_config_path, TomlConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE,
};
use bgg_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_full_config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bgg-enricher.toml");
    std::fs::write(
        &path,
        r#"
[settings]
load_from_file = true
load_file = "saved/TopGames.json"
count = 2000
start_position = 600
fetch_details = false

[api]
base_url = "http://localhost:8080/xmlapi2"
request_timeout_secs = 5

[enrichment]
batch_size = 10
delay_ms = 250
rate_limit_pause_ms = 1000
delay_increment_ms = 100
checkpoint_interval = 150
error_log_file = "logs/errors.log"

[logging]
level = "debug"
file = "logs/run.log"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();

    assert!(config.settings.load_from_file);
    assert_eq!(config.settings.load_file, PathBuf::from("saved/TopGames.json"));
    assert_eq!(config.settings.count, 2000);
    assert_eq!(config.settings.start_position, 600);
    assert!(!config.settings.fetch_details);
    assert_eq!(config.api.base_url, "http://localhost:8080/xmlapi2");
    assert_eq!(config.api.request_timeout().as_secs(), 5);
    assert!(config.api.bearer_token.is_none());
    assert_eq!(config.enrichment.batch_size, 10);
    assert_eq!(config.enrichment.checkpoint_interval, 150);
    assert_eq!(config.enrichment.error_log_file, PathBuf::from("logs/errors.log"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("logs/run.log")));
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[enrichment\nbatch_size = ").unwrap();

    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zero.toml");
    std::fs::write(&path, "[enrichment]\ncheckpoint_interval = 0\n").unwrap();

    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_path_overrides_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let path = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")));
    assert_eq!(path, PathBuf::from("/tmp/from-cli.toml"));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let path = resolve_config_path(None);
    assert_eq!(path, PathBuf::from("/tmp/from-env.toml"));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_default_path_without_cli_or_env() {
    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(resolve_config_path(None), PathBuf::from(DEFAULT_CONFIG_FILE));
}
