//! DraftKingsOdds Library
//!
//! A Rust library for fetching DraftKings pregame odds snapshots and
//! streaming live odds updates from the DraftKings push feed.

pub mod common;
pub mod config;
pub mod draftkings;
pub mod output;

// Re-export commonly used types
pub use common::errors::{ClientError, Result};
pub use common::traits::{EmailNotifier, OddsSink, SpreadsheetExporter};
pub use common::types::{
    GameOdds, ListenerEvent, ListenerState, MarketOdds, OddsUpdate, Outcome, OutcomeRecord,
    PresentedOutcome, UpdatePresentation,
};
pub use config::types::AppConfig;
pub use draftkings::client::DraftKingsClient;
pub use draftkings::filter::{FilterOutcome, FilterReason, SelectionFilter};
pub use draftkings::leagues::LeagueRegistry;
pub use draftkings::rest::DraftKingsRestClient;
pub use draftkings::websocket::{process_message, LiveOddsListener, ProcessOutcome};
pub use output::ConsoleSink;
