//! Configuration resolution for bgg-enricher
//!
//! Provides multi-tier bearer token resolution with ENV → TOML priority.
//! The CLI's `--bearer-token` flag is backed by the same environment
//! variable, so an explicit flag always lands in the first tier.

use bgg_common::config::TomlConfig;
use bgg_common::{Error, Result};
use tracing::{info, warn};

/// Environment variable holding the API bearer token
pub const BEARER_TOKEN_ENV_VAR: &str = "BGG_BEARER_TOKEN";

/// Resolve the API bearer token.
///
/// **Priority:** explicit/ENV value → TOML `api.bearer_token`
pub fn resolve_bearer_token(explicit: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    let env_token = explicit
        .map(str::to_string)
        .or_else(|| std::env::var(BEARER_TOKEN_ENV_VAR).ok())
        .filter(|t| is_valid_token(t));
    let toml_token = toml_config
        .api
        .bearer_token
        .clone()
        .filter(|t| is_valid_token(t));

    if env_token.is_some() && toml_token.is_some() {
        warn!("Bearer token found in both environment and TOML config. Using environment.");
    }

    if let Some(token) = env_token {
        info!("Bearer token loaded from environment/command line");
        return Ok(token.trim().to_string());
    }

    if let Some(token) = toml_token {
        info!("Bearer token loaded from TOML config");
        return Ok(token.trim().to_string());
    }

    Err(Error::Config(format!(
        "Bearer token not configured. Please configure using one of:\n\
         1. Command line: --bearer-token your-token-here\n\
         2. Environment: {}=your-token-here\n\
         3. TOML config: [api] bearer_token = \"your-token\" (not recommended)",
        BEARER_TOKEN_ENV_VAR
    )))
}

/// Validate token (non-empty, non-whitespace)
pub fn is_valid_token(token: &str) -> bool {
    !token.trim().is_empty()
}
