//! Odds records shared by the snapshot fetcher and the live listener

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One selectable bet line within a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome description as sent by the provider ("Over", "Boston Bruins", ...)
    pub label: String,
    /// Handicap or total; absent for moneyline-style markets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Decimal>,
    /// Price in decimal odds format
    pub odds_decimal: Decimal,
}

impl Outcome {
    /// Create an outcome without a line
    pub fn new(label: impl Into<String>, odds_decimal: Decimal) -> Self {
        Self {
            label: label.into(),
            line: None,
            odds_decimal,
        }
    }

    /// Attach a handicap/total line
    pub fn with_line(mut self, line: Decimal) -> Self {
        self.line = Some(line);
        self
    }

    /// Label used for display: `"{label} {line}"` when a line is present
    pub fn display_label(&self) -> String {
        match self.line {
            Some(line) => format!("{} {}", self.label, line),
            None => self.label.clone(),
        }
    }
}

/// One market's current state for one game, decoded from an `offer-updated` push
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsUpdate {
    /// Game identifier
    pub event_id: String,
    /// Market name ("Moneyline", "Total", ...)
    pub market_label: String,
    /// Outcomes in arrival order
    pub outcomes: Vec<Outcome>,
}

/// An outcome as it is shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentedOutcome {
    /// Label with the line merged in
    pub label: String,
    /// Price in decimal odds format
    pub odds_decimal: Decimal,
}

impl From<&Outcome> for PresentedOutcome {
    fn from(outcome: &Outcome) -> Self {
        Self {
            label: outcome.display_label(),
            odds_decimal: outcome.odds_decimal,
        }
    }
}

/// A filtered update ready to be emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePresentation {
    pub event_id: String,
    pub market: String,
    pub outcomes: Vec<PresentedOutcome>,
    /// When the listener received the push
    pub received_at: DateTime<Utc>,
}

impl UpdatePresentation {
    /// Build a presentation from a decoded update, preserving outcome order
    pub fn from_update(update: &OddsUpdate, received_at: DateTime<Utc>) -> Self {
        Self {
            event_id: update.event_id.clone(),
            market: update.market_label.clone(),
            outcomes: update.outcomes.iter().map(PresentedOutcome::from).collect(),
            received_at,
        }
    }

    /// Same content, ignoring the receive timestamp
    pub fn same_content(&self, other: &UpdatePresentation) -> bool {
        self.event_id == other.event_id
            && self.market == other.market
            && self.outcomes == other.outcomes
    }
}

impl fmt::Display for UpdatePresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "New odds update for '{}' (event {})",
            self.market, self.event_id
        )?;
        if !self.outcomes.is_empty() {
            writeln!(f)?;
        }
        let last = self.outcomes.len().saturating_sub(1);
        for (i, outcome) in self.outcomes.iter().enumerate() {
            write!(f, "  {} @ {}", outcome.label, outcome.odds_decimal)?;
            if i != last {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Everything the listener surfaces to its sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerEvent {
    /// The push server accepted the connection
    ConnectionEstablished,
    /// The push server confirmed our channel subscription
    SubscriptionSucceeded { channel: String },
    /// An odds update that passed the selection filter
    OddsUpdate(UpdatePresentation),
}

impl fmt::Display for ListenerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerEvent::ConnectionEstablished => write!(f, "Connection established!"),
            ListenerEvent::SubscriptionSucceeded { .. } => {
                write!(f, "Subscription succeeded, awaiting new odds updates...")
            }
            ListenerEvent::OddsUpdate(update) => write!(f, "{}", update),
        }
    }
}

/// Listener lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerState {
    Connecting,
    Subscribed,
    Listening,
    Closed,
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerState::Connecting => write!(f, "connecting"),
            ListenerState::Subscribed => write!(f, "subscribed"),
            ListenerState::Listening => write!(f, "listening"),
            ListenerState::Closed => write!(f, "closed"),
        }
    }
}

// ============================================================================
// Snapshot Records
// ============================================================================

/// Flattened outcome from the pregame snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Label with the line merged in
    pub label: String,
    pub odds: Decimal,
}

/// One market of a pregame game record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOdds {
    pub market_name: String,
    pub outcomes: Vec<OutcomeRecord>,
}

/// One game of the pregame snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOdds {
    /// Game label, e.g. "Boston Bruins @ Toronto Maple Leafs"
    pub game: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub markets: Vec<MarketOdds>,
}

impl GameOdds {
    /// Find a market by name
    pub fn market(&self, name: &str) -> Option<&MarketOdds> {
        self.markets.iter().find(|m| m.market_name == name)
    }
}
