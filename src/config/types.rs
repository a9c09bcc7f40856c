//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::common::errors::{ClientError, Result};
use crate::draftkings::leagues::LeagueRegistry;

/// Placeholder substituted with the provider league id in `pregame_url`
pub const LEAGUE_ID_PLACEHOLDER: &str = "{league_id}";

/// Substitute a provider league id into a pregame URL template
pub fn pregame_url_for(template: &str, league_id: &str) -> String {
    template.replace(LEAGUE_ID_PLACEHOLDER, league_id)
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// DraftKings-specific configuration
    #[serde(default)]
    pub draftkings: DraftKingsConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Check URLs and the league registry before any I/O happens
    pub fn validate(&self) -> Result<()> {
        self.draftkings.validate()?;
        self.settings.validate()
    }
}

/// DraftKings platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftKingsConfig {
    /// Event group endpoint, with `{league_id}` where the league id goes
    #[serde(default = "default_pregame_url")]
    pub pregame_url: String,
    /// Pusher WebSocket endpoint (protocol and client info live in the query)
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    /// League name to DraftKings event group id
    #[serde(default = "default_leagues")]
    pub leagues: BTreeMap<String, String>,
    /// League used when none is given on the command line
    #[serde(default = "default_league")]
    pub default_league: String,
}

impl Default for DraftKingsConfig {
    fn default() -> Self {
        Self {
            pregame_url: default_pregame_url(),
            websocket_url: default_websocket_url(),
            leagues: default_leagues(),
            default_league: default_league(),
        }
    }
}

impl DraftKingsConfig {
    /// Build the league registry from the configured table
    pub fn league_registry(&self) -> Result<LeagueRegistry> {
        LeagueRegistry::new(self.leagues.clone())
    }

    fn validate(&self) -> Result<()> {
        if !self.pregame_url.contains(LEAGUE_ID_PLACEHOLDER) {
            return Err(ClientError::Configuration(format!(
                "pregame_url must contain {}",
                LEAGUE_ID_PLACEHOLDER
            )));
        }
        url::Url::parse(&pregame_url_for(&self.pregame_url, "0"))
            .map_err(|e| ClientError::Configuration(format!("Invalid pregame_url: {}", e)))?;

        let ws_url = url::Url::parse(&self.websocket_url)
            .map_err(|e| ClientError::Configuration(format!("Invalid websocket_url: {}", e)))?;
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            return Err(ClientError::Configuration(format!(
                "websocket_url must use ws or wss, got {}",
                ws_url.scheme()
            )));
        }

        let registry = self.league_registry()?;
        registry.league_id(&self.default_league)?;
        Ok(())
    }
}

fn default_pregame_url() -> String {
    "https://sportsbook.draftkings.com//sites/US-SB/api/v5/eventgroups/{league_id}?format=json"
        .to_string()
}

fn default_websocket_url() -> String {
    "wss://ws-draftkingseu.pusher.com/app/490c3809b82ef97880f2?protocol=7&client=js&version=7.3.0&flash=false"
        .to_string()
}

fn default_leagues() -> BTreeMap<String, String> {
    [
        ("NHL", "42133"),
        ("NFL", "88808"),
        ("NBA", "42648"),
        ("England - Premier League", "40253"),
    ]
    .into_iter()
    .map(|(name, id)| (name.to_string(), id.to_string()))
    .collect()
}

fn default_league() -> String {
    "NHL".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Close the live stream after this many seconds without a message (0 = never)
    #[serde(default)]
    pub idle_timeout_seconds: u64,
    /// Buffer size for channel-backed sinks
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
            idle_timeout_seconds: 0,
            channel_buffer_size: default_channel_buffer_size(),
        }
    }
}

impl AppSettings {
    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Live stream idle timeout, `None` when disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_seconds > 0).then(|| Duration::from_secs(self.idle_timeout_seconds))
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            return Err(ClientError::Configuration(
                "request_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_channel_buffer_size() -> usize {
    1000
}
