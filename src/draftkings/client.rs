//! Main DraftKings client that combines snapshot and live stream functionality

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::filter::SelectionFilter;
use super::leagues::LeagueRegistry;
use super::rest::DraftKingsRestClient;
use super::websocket::LiveOddsListener;
use crate::common::channels::create_event_channel_with_size;
use crate::common::errors::Result;
use crate::common::traits::OddsSink;
use crate::common::types::{GameOdds, ListenerEvent};
use crate::config::types::AppConfig;
use crate::output::json::{default_snapshot_path, store_as_json};

/// DraftKings client bound to one league
#[derive(Debug, Clone)]
pub struct DraftKingsClient {
    /// REST client for snapshots
    rest_client: DraftKingsRestClient,
    /// League name as configured
    league: String,
    /// DraftKings event group id of the league
    league_id: String,
    /// Pusher endpoint
    websocket_url: String,
    /// Idle timeout handed to listeners
    idle_timeout: Option<Duration>,
    /// Buffer of channels built by `event_channel`
    channel_buffer_size: usize,
}

impl DraftKingsClient {
    /// Create a client for the configured default league
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::for_league(config, &config.draftkings.default_league)
    }

    /// Create a client for a named league from the registry
    pub fn for_league(config: &AppConfig, league: &str) -> Result<Self> {
        config.validate()?;
        let registry: LeagueRegistry = config.draftkings.league_registry()?;
        let league_id = registry.league_id(league)?.to_string();

        let rest_client = DraftKingsRestClient::with_timeout(
            &config.draftkings.pregame_url,
            config.settings.request_timeout(),
        )?;

        Ok(Self {
            rest_client,
            league: league.to_string(),
            league_id,
            websocket_url: config.draftkings.websocket_url.clone(),
            idle_timeout: config.settings.idle_timeout(),
            channel_buffer_size: config.settings.channel_buffer_size,
        })
    }

    /// League name
    pub fn league(&self) -> &str {
        &self.league
    }

    /// DraftKings event group id of the league
    pub fn league_id(&self) -> &str {
        &self.league_id
    }

    /// Get a reference to the REST client
    pub fn rest(&self) -> &DraftKingsRestClient {
        &self.rest_client
    }

    /// All games of the league and their event ids
    pub async fn get_event_ids(&self) -> Result<BTreeMap<String, String>> {
        self.rest_client.get_event_ids(&self.league_id).await
    }

    /// Main market odds for every game of the league
    pub async fn get_pregame_odds(&self) -> Result<Vec<GameOdds>> {
        self.rest_client.get_pregame_odds(&self.league_id).await
    }

    /// Dump games to `path`, or `{league}.json` when no path is given
    pub fn store_as_json(&self, games: &[GameOdds], path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_snapshot_path(&self.league));
        store_as_json(games, &path)?;
        Ok(path)
    }

    /// Build a live listener for this league
    pub fn live_listener(&self, filter: SelectionFilter) -> Result<LiveOddsListener> {
        Ok(LiveOddsListener::new(&self.websocket_url, &self.league_id, filter)?
            .with_idle_timeout(self.idle_timeout))
    }

    /// Channel sized from `settings.channel_buffer_size`, for streaming into another task
    pub fn event_channel(&self) -> (mpsc::Sender<ListenerEvent>, mpsc::Receiver<ListenerEvent>) {
        create_event_channel_with_size(self.channel_buffer_size)
    }

    /// Run a live odds stream into `sink` until cancelled or the transport fails
    #[instrument(skip(self, sink, cancel), fields(league = %self.league))]
    pub async fn live_odds_stream<S>(
        &self,
        filter: SelectionFilter,
        sink: &mut S,
        cancel: CancellationToken,
    ) -> Result<()>
    where
        S: OddsSink + ?Sized,
    {
        let mut listener = self.live_listener(filter)?;
        info!("Starting live odds stream on {}", listener.channel());
        listener.start(sink, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ClientError;

    #[test]
    fn test_client_creation() {
        let config = AppConfig::default();
        let client = DraftKingsClient::new(&config).unwrap();
        assert_eq!(client.league(), "NHL");
        assert_eq!(client.league_id(), "42133");
    }

    #[test]
    fn test_unknown_league_fails_before_io() {
        let config = AppConfig::default();
        let err = DraftKingsClient::for_league(&config, "Curling").unwrap_err();
        assert!(matches!(err, ClientError::UnknownLeague(_)));
    }

    #[test]
    fn test_live_listener_uses_league_channel() {
        let mut config = AppConfig::default();
        config.settings.idle_timeout_seconds = 3;
        let client = DraftKingsClient::for_league(&config, "nba").unwrap();
        let listener = client.live_listener(SelectionFilter::accept_all()).unwrap();
        assert_eq!(listener.channel(), "nj_ent-eventgroupv2-42648");
    }

    #[tokio::test]
    async fn test_event_channel_uses_configured_buffer() {
        let mut config = AppConfig::default();
        config.settings.channel_buffer_size = 2;
        let client = DraftKingsClient::new(&config).unwrap();

        let (tx, mut rx) = client.event_channel();
        assert_eq!(tx.max_capacity(), 2);
        tx.send(ListenerEvent::ConnectionEstablished).await.unwrap();
        tx.send(ListenerEvent::ConnectionEstablished).await.unwrap();
        assert!(tx.try_send(ListenerEvent::ConnectionEstablished).is_err());
        assert_eq!(rx.recv().await, Some(ListenerEvent::ConnectionEstablished));
    }
}
