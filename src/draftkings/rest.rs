//! REST client for the DraftKings event group endpoint

use reqwest::Client;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::leagues::validate_league_id;
use super::messages::{EventGroup, EventGroupResponse, WireMarket};
use crate::common::errors::{ClientError, Result};
use crate::common::types::{GameOdds, MarketOdds, Outcome, OutcomeRecord};
use crate::config::types::{pregame_url_for, LEAGUE_ID_PLACEHOLDER};

/// Name of the market whose outcome labels stand in for a missing game name
const MONEYLINE_MARKET: &str = "Moneyline";

/// REST client for pregame odds snapshots
#[derive(Debug, Clone)]
pub struct DraftKingsRestClient {
    /// HTTP client
    client: Client,
    /// Event group URL template with a `{league_id}` placeholder
    pregame_url: String,
}

impl DraftKingsRestClient {
    /// Create a new REST client
    pub fn new(pregame_url: &str) -> Result<Self> {
        Self::with_timeout(pregame_url, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(pregame_url: &str, timeout: Duration) -> Result<Self> {
        if !pregame_url.contains(LEAGUE_ID_PLACEHOLDER) {
            return Err(ClientError::Configuration(format!(
                "pregame_url must contain {}",
                LEAGUE_ID_PLACEHOLDER
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            pregame_url: pregame_url.to_string(),
        })
    }

    /// Snapshot URL for a league id
    pub fn url_for(&self, league_id: &str) -> String {
        pregame_url_for(&self.pregame_url, league_id)
    }

    /// Get all games of a league keyed by game name
    #[instrument(skip(self))]
    pub async fn get_event_ids(&self, league_id: &str) -> Result<BTreeMap<String, String>> {
        let group = self.get_event_group(league_id).await?;
        Ok(group
            .events
            .into_iter()
            .map(|event| (event.name, event.event_id))
            .collect())
    }

    /// Get the main markets for every game of a league
    ///
    /// Markets that cannot be read are skipped; the remaining markets of
    /// the game are still returned.
    #[instrument(skip(self))]
    pub async fn get_pregame_odds(&self, league_id: &str) -> Result<Vec<GameOdds>> {
        let group = self.get_event_group(league_id).await?;
        flatten_event_group(group)
    }

    async fn get_event_group(&self, league_id: &str) -> Result<EventGroup> {
        validate_league_id(league_id)?;
        let url = self.url_for(league_id);
        debug!("Fetching event group from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        let body: EventGroupResponse = response.json().await?;
        Ok(body.event_group)
    }
}

/// Flatten an event group into game records
pub fn flatten_event_group(group: EventGroup) -> Result<Vec<GameOdds>> {
    let names: HashMap<String, String> = group
        .events
        .iter()
        .map(|event| (event.event_id.clone(), event.name.clone()))
        .collect();

    let offers = group
        .offer_categories
        .into_iter()
        .next()
        .and_then(|category| category.offer_subcategory_descriptors.into_iter().next())
        .and_then(|descriptor| descriptor.offer_subcategory)
        .map(|subcategory| subcategory.offers)
        .ok_or_else(|| {
            ClientError::InvalidResponse("Event group has no offer subcategory".to_string())
        })?;

    Ok(offers
        .into_iter()
        .map(|game| flatten_game(game, &names))
        .collect())
}

fn flatten_game(raw_markets: Vec<Value>, names: &HashMap<String, String>) -> GameOdds {
    let mut event_id = None;
    let mut moneyline_labels = Vec::new();
    let mut markets = Vec::new();

    for raw in raw_markets {
        let market: WireMarket = match serde_json::from_value(raw) {
            Ok(market) => market,
            Err(e) => {
                warn!("Skipping unreadable market: {}", e);
                continue;
            }
        };
        let Some(market_name) = market.label else {
            // not posted yet, common for totals a few days out
            debug!("Skipping market without label");
            continue;
        };

        if event_id.is_none() {
            event_id = market.event_id.clone();
        }
        let outcomes: Vec<Outcome> = market.outcomes.into_iter().map(Outcome::from).collect();
        if market_name == MONEYLINE_MARKET {
            moneyline_labels = outcomes.iter().map(|o| o.label.clone()).collect();
        }

        markets.push(MarketOdds {
            market_name,
            outcomes: outcomes
                .iter()
                .map(|o| OutcomeRecord {
                    label: o.display_label(),
                    odds: o.odds_decimal,
                })
                .collect(),
        });
    }

    let game = event_id
        .as_ref()
        .and_then(|id| names.get(id).cloned())
        .unwrap_or_else(|| moneyline_labels.join(" v "));

    GameOdds {
        game,
        event_id,
        markets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn group(value: Value) -> EventGroup {
        serde_json::from_value::<EventGroupResponse>(value)
            .unwrap()
            .event_group
    }

    #[test]
    fn test_client_creation() {
        let client = DraftKingsRestClient::new("https://example.com/eventgroups/{league_id}");
        assert!(client.is_ok());
        assert_eq!(
            client.unwrap().url_for("42133"),
            "https://example.com/eventgroups/42133"
        );
    }

    #[test]
    fn test_client_rejects_template_without_placeholder() {
        assert!(DraftKingsRestClient::new("https://example.com/eventgroups/1").is_err());
    }

    #[test]
    fn test_flatten_uses_event_name_and_merges_lines() {
        let games = flatten_event_group(group(json!({
            "eventGroup": {
                "events": [{"eventId": 1001, "name": "BOS Bruins @ TOR Maple Leafs"}],
                "offerCategories": [{
                    "offerSubcategoryDescriptors": [{
                        "offerSubcategory": {"offers": [[
                            {"label": "Puck Line", "eventId": 1001, "outcomes": [
                                {"label": "BOS Bruins", "line": 1.5, "oddsDecimal": 1.45},
                                {"label": "TOR Maple Leafs", "line": -1.5, "oddsDecimal": 2.75}
                            ]},
                            {"label": "Moneyline", "eventId": 1001, "outcomes": [
                                {"label": "BOS Bruins", "oddsDecimal": 2.2},
                                {"label": "TOR Maple Leafs", "oddsDecimal": 1.7}
                            ]}
                        ]]}
                    }]
                }]
            }
        })))
        .unwrap();

        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.game, "BOS Bruins @ TOR Maple Leafs");
        assert_eq!(game.event_id.as_deref(), Some("1001"));

        let puck_line = game.market("Puck Line").unwrap();
        assert_eq!(puck_line.outcomes[0].label, "BOS Bruins 1.5");
        assert_eq!(puck_line.outcomes[1].label, "TOR Maple Leafs -1.5");

        let moneyline = game.market("Moneyline").unwrap();
        assert_eq!(moneyline.outcomes[1].odds, dec!(1.7));
    }

    #[test]
    fn test_flatten_falls_back_to_moneyline_labels_and_skips_bad_markets() {
        let games = flatten_event_group(group(json!({
            "eventGroup": {
                "offerCategories": [{
                    "offerSubcategoryDescriptors": [{
                        "offerSubcategory": {"offers": [[
                            {"outcomes": []},
                            {"label": "Total", "outcomes": "broken"},
                            {"label": "Moneyline", "outcomes": [
                                {"label": "Away Team", "oddsDecimal": 2.5},
                                {"label": "Home Team", "oddsDecimal": 1.55}
                            ]}
                        ]]}
                    }]
                }]
            }
        })))
        .unwrap();

        let game = &games[0];
        assert_eq!(game.game, "Away Team v Home Team");
        assert_eq!(game.event_id, None);
        assert_eq!(game.markets.len(), 1);
    }

    #[test]
    fn test_flatten_without_offers_is_invalid_response() {
        let err = flatten_event_group(group(json!({"eventGroup": {"events": []}}))).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
