//! Output capabilities the odds clients write into

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::errors::{ClientError, Result};
use super::types::{GameOdds, ListenerEvent};

/// Destination for everything a live listener surfaces
///
/// The listener calls `emit` once per notice or passing update, in
/// arrival order, from a single task.
///
/// # Example
///
/// ```ignore
/// struct CountingSink(usize);
///
/// #[async_trait]
/// impl OddsSink for CountingSink {
///     async fn emit(&mut self, _event: ListenerEvent) -> Result<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait OddsSink: Send {
    /// Handle one listener event
    ///
    /// Returning `ClientError::ChannelSend` stops the listener, since
    /// nobody is left to consume updates. Any other error is logged and
    /// the listener keeps going.
    async fn emit(&mut self, event: ListenerEvent) -> Result<()>;
}

#[async_trait]
impl OddsSink for mpsc::Sender<ListenerEvent> {
    async fn emit(&mut self, event: ListenerEvent) -> Result<()> {
        self.send(event)
            .await
            .map_err(|e| ClientError::ChannelSend(e.to_string()))
    }
}

#[async_trait]
impl OddsSink for Vec<ListenerEvent> {
    async fn emit(&mut self, event: ListenerEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// Export of pregame snapshots to a spreadsheet
pub trait SpreadsheetExporter: Send + Sync {
    /// Write the games to `path`
    fn export(&self, games: &[GameOdds], path: &Path) -> Result<()>;
}

/// Notification of odds content by email
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Send `content` to the configured recipients
    async fn notify(&self, subject: &str, content: &str) -> Result<()>;
}
