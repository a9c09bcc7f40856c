//! Error types for the application

use thiserror::Error;

use super::types::ListenerState;

/// Result type alias using our ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Main error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// WebSocket connection errors
    #[error("WebSocket connection error: {0}")]
    WebSocketConnection(String),

    /// The push server dropped or closed the connection while listening
    #[error("Transport closed while {state}: {reason}")]
    TransportClosed {
        state: ListenerState,
        reason: String,
    },

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A push message had an unexpected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// League name missing from the registry
    #[error("Unknown league: {0}")]
    UnknownLeague(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send errors
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether this error ends a listener run
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::WebSocketConnection(_)
                | ClientError::TransportClosed { .. }
                | ClientError::Timeout(_)
        )
    }
}
