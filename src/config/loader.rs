//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{ClientError, Result};

/// Provider variables and the config keys they override
const DRAFTKINGS_ENV_KEYS: &[(&str, &str)] = &[
    ("DRAFTKINGS_PREGAME_URL", "draftkings.pregame_url"),
    ("DRAFTKINGS_WS_URL", "draftkings.websocket_url"),
    ("DRAFTKINGS_LEAGUE", "draftkings.default_league"),
    ("DRAFTKINGS_LOG_LEVEL", "settings.log_level"),
    ("DRAFTKINGS_IDLE_TIMEOUT", "settings.idle_timeout_seconds"),
    ("DRAFTKINGS_CHANNEL_BUFFER", "settings.channel_buffer_size"),
];

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. DRAFTKINGS_* variables (e.g. DRAFTKINGS_WS_URL)
/// 2. Environment variables (prefixed with APP__)
/// 3. Configuration file (TOML format)
/// 4. Default values
///
/// The result is validated before it is returned.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    load_config_with(config_path, |name| std::env::var(name).ok())
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();
    load_config(None)
}

fn load_config_with<F>(config_path: Option<&str>, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    for (var, key) in DRAFTKINGS_ENV_KEYS {
        builder = builder
            .set_override_option(*key, lookup(var))
            .map_err(|e| ClientError::Configuration(format!("{}: {}", var, e)))?;
    }

    let config = builder
        .build()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    app_config.validate()?;
    Ok(app_config)
}
