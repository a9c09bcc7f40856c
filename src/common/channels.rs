//! Channel helpers for consuming listener events from another task

use tokio::sync::mpsc;

use super::types::ListenerEvent;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// Create a new listener event channel with the default buffer size
pub fn create_event_channel() -> (mpsc::Sender<ListenerEvent>, mpsc::Receiver<ListenerEvent>) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new listener event channel with a custom buffer size
///
/// A size of zero falls back to one, since tokio rejects empty buffers.
pub fn create_event_channel_with_size(
    size: usize,
) -> (mpsc::Sender<ListenerEvent>, mpsc::Receiver<ListenerEvent>) {
    mpsc::channel(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::OddsSink;

    #[tokio::test]
    async fn test_sender_sink_forwards_events() {
        let (mut tx, mut rx) = create_event_channel_with_size(0);
        tx.emit(ListenerEvent::ConnectionEstablished).await.unwrap();
        assert_eq!(rx.recv().await, Some(ListenerEvent::ConnectionEstablished));
    }

    #[tokio::test]
    async fn test_sender_sink_reports_dropped_receiver() {
        let (mut tx, rx) = create_event_channel();
        drop(rx);
        let err = tx.emit(ListenerEvent::ConnectionEstablished).await.unwrap_err();
        assert!(matches!(err, crate::ClientError::ChannelSend(_)));
    }
}
