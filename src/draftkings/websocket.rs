//! Live odds listener for the DraftKings push feed

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use super::filter::{FilterOutcome, FilterReason, SelectionFilter};
use super::leagues::{channel_for, validate_league_id};
use super::messages::{MessageKind, PusherEnvelope, SubscribeMessage};
use crate::common::errors::{ClientError, Result};
use crate::common::traits::OddsSink;
use crate::common::types::{ListenerEvent, ListenerState, UpdatePresentation};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a single inbound text frame turned into
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Connection or subscription notice
    Notice(ListenerEvent),
    /// Odds update that passed the filter
    Update(UpdatePresentation),
    /// Odds update the caller did not ask for
    Filtered(FilterReason),
    /// Event type we do not handle
    Ignored(Option<String>),
    /// Envelope or payload could not be decoded
    DecodeError(String),
}

impl ProcessOutcome {
    /// The event to emit, if any
    pub fn into_event(self) -> Option<ListenerEvent> {
        match self {
            ProcessOutcome::Notice(event) => Some(event),
            ProcessOutcome::Update(update) => Some(ListenerEvent::OddsUpdate(update)),
            _ => None,
        }
    }
}

/// Classify, decode and filter one text frame
///
/// Pure: the same frame, filter and timestamp always give the same outcome.
pub fn process_message(
    text: &str,
    filter: &SelectionFilter,
    received_at: DateTime<Utc>,
) -> ProcessOutcome {
    let envelope = match PusherEnvelope::parse(text) {
        Ok(envelope) => envelope,
        Err(e) => return ProcessOutcome::DecodeError(e.to_string()),
    };

    match envelope.kind() {
        MessageKind::ConnectionEstablished => {
            ProcessOutcome::Notice(ListenerEvent::ConnectionEstablished)
        }
        MessageKind::SubscriptionSucceeded => {
            ProcessOutcome::Notice(ListenerEvent::SubscriptionSucceeded {
                channel: envelope.channel.as_str().unwrap_or_default().to_string(),
            })
        }
        MessageKind::Other(event) => ProcessOutcome::Ignored(event),
        MessageKind::OfferUpdated => {
            let update = match envelope.decode_offer_update() {
                Ok(update) => update,
                Err(e) => return ProcessOutcome::DecodeError(e.to_string()),
            };
            match filter.evaluate(&update) {
                FilterOutcome::Pass => {
                    ProcessOutcome::Update(UpdatePresentation::from_update(&update, received_at))
                }
                FilterOutcome::Filtered(reason) => ProcessOutcome::Filtered(reason),
            }
        }
    }
}

/// Listener for one league's odds channel
///
/// Owns a single connection per `start` call and processes frames
/// strictly in arrival order. There is no reconnect: a transport failure
/// closes the connection and ends the run.
#[derive(Debug, Clone)]
pub struct LiveOddsListener {
    /// Pusher WebSocket URL
    url: String,
    /// Channel derived from the league id
    channel: String,
    /// Which updates to surface
    filter: SelectionFilter,
    /// Close after this long without any frame
    idle_timeout: Option<Duration>,
    /// Lifecycle state, for diagnostics
    state: ListenerState,
}

impl LiveOddsListener {
    /// Create a listener for the given endpoint and DraftKings league id
    pub fn new(url: &str, league_id: &str, filter: SelectionFilter) -> Result<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ClientError::Configuration(format!("Invalid WebSocket URL: {}", e)))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(ClientError::Configuration(format!(
                "WebSocket URL must use ws or wss, got {}",
                parsed.scheme()
            )));
        }
        validate_league_id(league_id)?;

        Ok(Self {
            url: url.to_string(),
            channel: channel_for(league_id),
            filter,
            idle_timeout: None,
            state: ListenerState::Connecting,
        })
    }

    /// Terminate the run after `idle` without an inbound frame
    pub fn with_idle_timeout(mut self, idle: Option<Duration>) -> Self {
        self.idle_timeout = idle;
        self
    }

    /// Channel this listener subscribes to
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Selection filter
    pub fn filter(&self) -> &SelectionFilter {
        &self.filter
    }

    /// Current lifecycle state
    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Connect, subscribe and emit updates until cancelled or the transport fails
    ///
    /// Returns `Ok(())` when `cancel` fires or the sink's receiver is gone,
    /// and an error when the connection drops, the server closes it, or the
    /// idle timeout elapses. The connection is closed exactly once either way.
    #[instrument(skip(self, sink, cancel), fields(channel = %self.channel))]
    pub async fn start<S>(&mut self, sink: &mut S, cancel: CancellationToken) -> Result<()>
    where
        S: OddsSink + ?Sized,
    {
        self.state = ListenerState::Connecting;
        info!("Connecting to DraftKings push server: {}", self.url);

        let url = self.url.clone();
        let connected = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Cancelled before the connection was established");
                self.state = ListenerState::Closed;
                return Ok(());
            }
            result = connect_async(url.as_str()) => result,
        };

        let (mut ws_stream, _response) = match connected {
            Ok(pair) => pair,
            Err(e) => {
                self.state = ListenerState::Closed;
                return Err(ClientError::WebSocketConnection(e.to_string()));
            }
        };
        debug!("WebSocket connection open");

        let outcome = self.run(&mut ws_stream, sink, &cancel).await;
        if let Err(ref e) = outcome {
            error!("Live odds stream stopped in state {}: {}", self.state, e);
        }
        self.close(&mut ws_stream).await;
        outcome
    }

    async fn run<S>(
        &mut self,
        ws_stream: &mut WsStream,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        S: OddsSink + ?Sized,
    {
        let subscribe_msg = SubscribeMessage::for_channel(self.channel.as_str());
        let msg_json = serde_json::to_string(&subscribe_msg)?;
        debug!("Sending subscription message: {}", msg_json);
        if let Err(e) = ws_stream.send(Message::Text(msg_json)).await {
            return Err(self.transport_error(e.to_string()));
        }
        self.state = ListenerState::Subscribed;
        info!("Subscription request sent for {}", self.channel);

        self.state = ListenerState::Listening;
        loop {
            if cancel.is_cancelled() {
                info!("Listener cancelled");
                return Ok(());
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Listener cancelled");
                    return Ok(());
                }
                next = next_frame(ws_stream, self.idle_timeout) => next,
            };

            let frame = match next {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(e))) => return Err(self.transport_error(e.to_string())),
                Ok(None) => return Err(self.transport_error("stream ended".to_string())),
                Err(_) => {
                    return Err(ClientError::Timeout(format!(
                        "no message for {:?} on {}",
                        self.idle_timeout.unwrap_or_default(),
                        self.channel
                    )))
                }
            };

            match frame {
                Message::Text(text) => {
                    if self.handle_text(&text, sink).await.is_break() {
                        info!("Event receiver dropped, stopping listener");
                        return Ok(());
                    }
                }
                Message::Close(frame) => {
                    let reason = frame
                        .map(|f| format!("server closed connection: {} {}", f.code, f.reason))
                        .unwrap_or_else(|| "server closed connection".to_string());
                    return Err(self.transport_error(reason));
                }
                Message::Ping(_) | Message::Pong(_) => trace!("Control frame received"),
                Message::Binary(data) => debug!("Ignoring {} byte binary frame", data.len()),
                Message::Frame(_) => {}
            }
        }
    }

    async fn handle_text<S>(&self, text: &str, sink: &mut S) -> ControlFlow<()>
    where
        S: OddsSink + ?Sized,
    {
        let event = match process_message(text, &self.filter, Utc::now()) {
            ProcessOutcome::Notice(event) => {
                info!("{}", event);
                event
            }
            ProcessOutcome::Update(update) => {
                debug!(
                    event_id = %update.event_id,
                    market = %update.market,
                    "Odds update passed filter"
                );
                ListenerEvent::OddsUpdate(update)
            }
            ProcessOutcome::Filtered(reason) => {
                trace!("Update skipped: {}", reason);
                return ControlFlow::Continue(());
            }
            ProcessOutcome::Ignored(event) => {
                trace!("Ignoring event {:?}", event);
                return ControlFlow::Continue(());
            }
            ProcessOutcome::DecodeError(e) => {
                warn!("Failed to decode message: {} - {}", e, text);
                return ControlFlow::Continue(());
            }
        };

        match sink.emit(event).await {
            Ok(()) => ControlFlow::Continue(()),
            Err(ClientError::ChannelSend(_)) => ControlFlow::Break(()),
            Err(e) => {
                error!("Sink failed to handle event: {}", e);
                ControlFlow::Continue(())
            }
        }
    }

    async fn close(&mut self, ws_stream: &mut WsStream) {
        if let Err(e) = ws_stream.close(None).await {
            debug!("Close handshake did not complete: {}", e);
        }
        self.state = ListenerState::Closed;
        info!("DraftKings push connection closed");
    }

    fn transport_error(&self, reason: String) -> ClientError {
        ClientError::TransportClosed {
            state: self.state,
            reason,
        }
    }
}

async fn next_frame(
    ws_stream: &mut WsStream,
    idle: Option<Duration>,
) -> std::result::Result<
    Option<std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>,
    tokio::time::error::Elapsed,
> {
    match idle {
        Some(limit) => timeout(limit, ws_stream.next()).await,
        None => Ok(ws_stream.next().await),
    }
}
