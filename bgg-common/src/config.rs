//! Configuration loading for the BGG data fetcher
//!
//! Bootstrap configuration lives in a single TOML file. Every key has a
//! built-in default, so a missing file or a partial file still yields a
//! usable configuration (with a warning), never a startup failure.
//!
//! Config file resolution priority:
//! 1. Command-line argument
//! 2. Environment variable (`BGG_CONFIG`)
//! 3. `bgg-enricher.toml` in the working directory

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "BGG_CONFIG";

/// Default config file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bgg-enricher.toml";

/// Complete TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub settings: RunSettings,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to fetch and where to put it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Read the candidate list from `load_file` instead of the data dump
    pub load_from_file: bool,
    pub data_dump_file: PathBuf,
    /// Number of candidates to read from the data dump
    pub count: usize,
    /// 0-based candidate index to resume enrichment from
    pub start_position: usize,
    pub load_file: PathBuf,
    pub save_basic_file: PathBuf,
    pub save_detailed_file: PathBuf,
    /// Skip the API enrichment step entirely
    pub fetch_details: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            load_from_file: false,
            data_dump_file: PathBuf::from("boardgames_ranks.zip"),
            count: 100,
            start_position: 0,
            load_file: PathBuf::from("TopGames.json"),
            save_basic_file: PathBuf::from("TopGames.json"),
            save_detailed_file: PathBuf::from("TopGamesDetailed.json"),
            fetch_details: true,
        }
    }
}

/// Remote XML API access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token; prefer the environment variable over storing it here
    pub bearer_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://boardgamegeek.com/xmlapi2".to_string(),
            bearer_token: None,
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Batch pacing, backoff and checkpoint tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// IDs per API call
    pub batch_size: usize,
    /// Initial pause between batches
    pub delay_ms: u64,
    /// Cooldown after a 429 response
    pub rate_limit_pause_ms: u64,
    /// Permanent increase of the inter-batch pause per 429 response
    pub delay_increment_ms: u64,
    /// Save a progress snapshot every this many processed records
    pub checkpoint_interval: usize,
    pub error_log_file: PathBuf,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            delay_ms: 1000,
            rate_limit_pause_ms: 5000,
            delay_increment_ms: 500,
            checkpoint_interval: 300,
            error_log_file: PathBuf::from("bgg_errors.log"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve which config file to read: CLI → ENV → working-directory default
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Load configuration, falling back to defaults when the file is missing.
///
/// A file that exists but cannot be parsed is an error: silently ignoring a
/// typo'd config would run with settings the user did not ask for.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            file = %path.display(),
            "Config file not found, using built-in defaults"
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    config.validate()?;
    info!(file = %path.display(), "Loaded configuration");
    Ok(config)
}

impl TomlConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.enrichment.batch_size == 0 {
            return Err(Error::Config("enrichment.batch_size must be at least 1".to_string()));
        }
        if self.enrichment.checkpoint_interval == 0 {
            return Err(Error::Config(
                "enrichment.checkpoint_interval must be at least 1".to_string(),
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = TomlConfig::default();
        assert_eq!(config.enrichment.batch_size, 20);
        assert_eq!(config.enrichment.delay_ms, 1000);
        assert_eq!(config.enrichment.rate_limit_pause_ms, 5000);
        assert_eq!(config.enrichment.delay_increment_ms, 500);
        assert_eq!(config.enrichment.checkpoint_interval, 300);
        assert!(config.settings.fetch_details);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [settings]
            count = 500

            [enrichment]
            batch_size = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.count, 500);
        assert_eq!(config.settings.save_detailed_file, PathBuf::from("TopGamesDetailed.json"));
        assert_eq!(config.enrichment.batch_size, 10);
        assert_eq!(config.enrichment.delay_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = TomlConfig::default();
        config.enrichment.batch_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
