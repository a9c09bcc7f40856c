//! League registry and push channel naming

use std::collections::BTreeMap;

use crate::common::errors::{ClientError, Result};

/// Prefix of the event group channel on the push server
pub const CHANNEL_PREFIX: &str = "nj_ent-eventgroupv2-";

/// Push channel for a DraftKings event group id
pub fn channel_for(league_id: &str) -> String {
    format!("{}{}", CHANNEL_PREFIX, league_id)
}

/// Check that a provider league id is a non-empty string of digits
pub fn validate_league_id(league_id: &str) -> Result<()> {
    if league_id.is_empty() || !league_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Configuration(format!(
            "League id must be numeric, got '{}'",
            league_id
        )));
    }
    Ok(())
}

/// Mapping from league name to DraftKings event group id
///
/// Lookups ignore ASCII case so "nba" and "NBA" resolve the same league.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueRegistry {
    leagues: BTreeMap<String, String>,
}

impl LeagueRegistry {
    /// Build a registry, rejecting empty tables and non-numeric ids
    pub fn new(leagues: BTreeMap<String, String>) -> Result<Self> {
        if leagues.is_empty() {
            return Err(ClientError::Configuration(
                "League registry is empty".to_string(),
            ));
        }
        for (name, id) in &leagues {
            validate_league_id(id).map_err(|_| {
                ClientError::Configuration(format!(
                    "League '{}' has a non-numeric id '{}'",
                    name, id
                ))
            })?;
        }
        Ok(Self { leagues })
    }

    /// Event group id for a league name
    pub fn league_id(&self, league: &str) -> Result<&str> {
        self.leagues
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(league))
            .map(|(_, id)| id.as_str())
            .ok_or_else(|| ClientError::UnknownLeague(league.to_string()))
    }

    /// Push channel for a league name
    pub fn channel(&self, league: &str) -> Result<String> {
        self.league_id(league).map(channel_for)
    }

    /// Registered league names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.leagues.keys().map(String::as_str)
    }
}
