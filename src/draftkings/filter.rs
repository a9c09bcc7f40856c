//! Selection filter applied to decoded odds updates

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::common::types::OddsUpdate;

/// Which updates the caller wants to see
///
/// `None` on a dimension accepts everything; `Some` of an empty set
/// accepts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFilter {
    pub event_ids: Option<HashSet<String>>,
    pub markets: Option<HashSet<String>>,
}

/// Why an update was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterReason {
    EventId(String),
    Market(String),
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterReason::EventId(id) => write!(f, "event id {} not selected", id),
            FilterReason::Market(market) => write!(f, "market '{}' not selected", market),
        }
    }
}

/// Result of checking an update against the filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Pass,
    Filtered(FilterReason),
}

impl SelectionFilter {
    /// Filter that accepts every update
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Restrict to the given event ids
    pub fn with_event_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to the given market names
    pub fn with_markets<I, S>(mut self, markets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markets = Some(markets.into_iter().map(Into::into).collect());
        self
    }

    /// Event id check first, then market
    pub fn evaluate(&self, update: &OddsUpdate) -> FilterOutcome {
        if let Some(ids) = &self.event_ids {
            if !ids.contains(&update.event_id) {
                return FilterOutcome::Filtered(FilterReason::EventId(update.event_id.clone()));
            }
        }
        if let Some(markets) = &self.markets {
            if !markets.contains(&update.market_label) {
                return FilterOutcome::Filtered(FilterReason::Market(update.market_label.clone()));
            }
        }
        FilterOutcome::Pass
    }
}
