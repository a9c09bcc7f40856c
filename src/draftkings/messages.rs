//! DraftKings wire types for the Pusher feed and the event group endpoint

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::common::errors::{ClientError, Result};
use crate::common::types::{OddsUpdate, Outcome};

/// Subscribe command understood by the Pusher server
pub const SUBSCRIBE_EVENT: &str = "pusher:subscribe";
/// Sent by the server once the socket is open
pub const CONNECTION_ESTABLISHED_EVENT: &str = "pusher:connection_established";
/// Sent by the server once our channel subscription is active
pub const SUBSCRIPTION_SUCCEEDED_EVENT: &str = "pusher_internal:subscription_succeeded";
/// Carries an odds update for one market
pub const OFFER_UPDATED_EVENT: &str = "offer-updated";

// ============================================================================
// Outbound
// ============================================================================

/// Channel subscription control message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeMessage {
    pub event: String,
    pub data: SubscribeData,
}

/// Body of the subscription message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeData {
    /// Public channels take an empty auth string
    pub auth: String,
    pub channel: String,
}

impl SubscribeMessage {
    /// Subscribe to a public channel
    pub fn for_channel(channel: impl Into<String>) -> Self {
        Self {
            event: SUBSCRIBE_EVENT.to_string(),
            data: SubscribeData {
                auth: String::new(),
                channel: channel.into(),
            },
        }
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// Outer Pusher envelope; `data` is usually a JSON document encoded as a string
#[derive(Debug, Clone, Deserialize)]
pub struct PusherEnvelope {
    #[serde(default)]
    pub event: Value,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub channel: Value,
}

/// First-level classification of an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    ConnectionEstablished,
    SubscriptionSucceeded,
    OfferUpdated,
    /// Any other event name, or no usable event name at all
    Other(Option<String>),
}

impl MessageKind {
    /// Total over every possible `event` value
    pub fn classify(event: &Value) -> Self {
        match event.as_str() {
            Some(CONNECTION_ESTABLISHED_EVENT) => MessageKind::ConnectionEstablished,
            Some(SUBSCRIPTION_SUCCEEDED_EVENT) => MessageKind::SubscriptionSucceeded,
            Some(OFFER_UPDATED_EVENT) => MessageKind::OfferUpdated,
            Some(other) => MessageKind::Other(Some(other.to_string())),
            None => MessageKind::Other(None),
        }
    }
}

impl PusherEnvelope {
    /// Parse the outer envelope of a text frame
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ClientError::Decode(format!("malformed envelope: {}", e)))?;
        if !value.is_object() {
            return Err(ClientError::Decode(
                "envelope is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("malformed envelope: {}", e)))
    }

    /// Classify by the `event` field
    pub fn kind(&self) -> MessageKind {
        MessageKind::classify(&self.event)
    }

    /// Decode the inner `data` document into an odds update
    ///
    /// Only the first offer of the inner `data` list is used.
    pub fn decode_offer_update(&self) -> Result<OddsUpdate> {
        let payload: OfferUpdatedPayload = match &self.data {
            Value::String(encoded) => serde_json::from_str(encoded),
            Value::Null => {
                return Err(ClientError::Decode(
                    "offer-updated message has no data".to_string(),
                ))
            }
            other => serde_json::from_value(other.clone()),
        }
        .map_err(|e| ClientError::Decode(format!("malformed offer payload: {}", e)))?;

        payload
            .data
            .into_iter()
            .next()
            .map(OddsUpdate::from)
            .ok_or_else(|| ClientError::Decode("offer payload has no offers".to_string()))
    }
}

/// Decoded `data` of an `offer-updated` message
#[derive(Debug, Clone, Deserialize)]
pub struct OfferUpdatedPayload {
    pub data: Vec<WireOffer>,
}

/// One market for one game as pushed by the feed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOffer {
    #[serde(deserialize_with = "string_or_number")]
    pub event_id: String,
    pub label: String,
    pub outcomes: Vec<WireOutcome>,
}

/// Outcome shape shared by the feed and the event group endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOutcome {
    pub label: String,
    #[serde(default)]
    pub line: Option<Decimal>,
    pub odds_decimal: Decimal,
}

impl From<WireOutcome> for Outcome {
    fn from(outcome: WireOutcome) -> Self {
        Outcome {
            label: outcome.label,
            line: outcome.line,
            odds_decimal: outcome.odds_decimal,
        }
    }
}

impl From<WireOffer> for OddsUpdate {
    fn from(offer: WireOffer) -> Self {
        OddsUpdate {
            event_id: offer.event_id,
            market_label: offer.label,
            outcomes: offer.outcomes.into_iter().map(Outcome::from).collect(),
        }
    }
}

// ============================================================================
// Event Group (REST) Response Types
// ============================================================================

/// Response from GET /eventgroups/{league_id}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGroupResponse {
    pub event_group: EventGroup,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGroup {
    #[serde(default)]
    pub events: Vec<EventSummary>,
    #[serde(default)]
    pub offer_categories: Vec<OfferCategory>,
}

/// A scheduled game
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub event_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferCategory {
    #[serde(default)]
    pub offer_subcategory_descriptors: Vec<OfferSubcategoryDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSubcategoryDescriptor {
    #[serde(default)]
    pub offer_subcategory: Option<OfferSubcategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferSubcategory {
    /// One entry per game, each a list of raw markets
    #[serde(default)]
    pub offers: Vec<Vec<Value>>,
}

/// Market as listed by the event group endpoint
///
/// `label` is missing for markets that are not posted yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMarket {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub event_id: Option<String>,
    pub outcomes: Vec<WireOutcome>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}
