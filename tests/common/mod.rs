//! Common test utilities and fixtures

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};

/// What the mock server does once its script has been sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterScript {
    /// Send a close frame
    Close,
    /// Drop the TCP stream without a close handshake
    Drop,
    /// Keep the connection open until the client closes it
    Hold,
}

/// A scripted Pusher server for a single client connection
///
/// It waits for the subscription message, replays `script` in order and
/// then behaves according to `after`.
pub struct MockPusherServer {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<String>>>,
    close_frames: Arc<AtomicUsize>,
}

impl MockPusherServer {
    pub async fn start(script: Vec<String>, after: AfterScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let close_frames = Arc::new(AtomicUsize::new(0));

        let received_clone = received.clone();
        let close_frames_clone = close_frames.clone();
        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    eprintln!("WebSocket handshake failed: {}", e);
                    return;
                }
            };
            let (mut write, mut read) = ws_stream.split();

            // subscription comes first
            if let Some(Ok(Message::Text(text))) = read.next().await {
                received_clone.lock().unwrap().push(text);
            }

            for text in script {
                if write.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }

            match after {
                AfterScript::Drop => return,
                AfterScript::Close => {
                    let frame = CloseFrame {
                        code: CloseCode::Away,
                        reason: "server restart".into(),
                    };
                    let _ = write.send(Message::Close(Some(frame))).await;
                }
                AfterScript::Hold => {}
            }

            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => received_clone.lock().unwrap().push(text),
                    Ok(Message::Close(_)) => {
                        close_frames_clone.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        });

        Self {
            addr,
            received,
            close_frames,
        }
    }

    /// WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/app/test?protocol=7&client=js", self.addr)
    }

    /// Text frames received from the client
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Wait until at least `count` close frames arrived, returning the final tally
    pub async fn wait_for_close_frames(&self, count: usize) -> usize {
        for _ in 0..100 {
            if self.close_frames.load(Ordering::SeqCst) >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        // give a duplicate frame the chance to show up
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.close_frames.load(Ordering::SeqCst)
    }
}

/// Sample Pusher messages
pub mod ws_messages {
    use super::*;

    pub fn connection_established() -> String {
        json!({
            "event": "pusher:connection_established",
            "data": "{\"socket_id\":\"123.456\",\"activity_timeout\":120}"
        })
        .to_string()
    }

    pub fn subscription_succeeded(channel: &str) -> String {
        json!({
            "event": "pusher_internal:subscription_succeeded",
            "data": "{}",
            "channel": channel
        })
        .to_string()
    }

    pub fn offer_updated(event_id: &str, market: &str, outcomes: serde_json::Value) -> String {
        let inner = json!({
            "data": [{"eventId": event_id, "label": market, "outcomes": outcomes}]
        });
        json!({
            "event": "offer-updated",
            "data": inner.to_string(),
            "channel": "nj_ent-eventgroupv2-42133"
        })
        .to_string()
    }

    pub fn moneyline(event_id: &str) -> String {
        offer_updated(
            event_id,
            "Moneyline",
            json!([
                {"label": "Home", "oddsDecimal": 1.91},
                {"label": "Away", "oddsDecimal": 1.95}
            ]),
        )
    }

    pub fn total(event_id: &str) -> String {
        offer_updated(
            event_id,
            "Total",
            json!([
                {"label": "Over", "line": 6.5, "oddsDecimal": 2.05},
                {"label": "Under", "line": 6.5, "oddsDecimal": 1.8}
            ]),
        )
    }

    /// offer-updated without the outcomes field
    pub fn missing_outcomes(event_id: &str) -> String {
        let inner = json!({"data": [{"eventId": event_id, "label": "Moneyline"}]});
        json!({"event": "offer-updated", "data": inner.to_string()}).to_string()
    }

    pub fn unrelated(event: &str) -> String {
        json!({"event": event, "data": "{}"}).to_string()
    }
}

/// Sample event group responses
pub mod api_responses {
    /// Event group with one game and three markets
    pub const EVENT_GROUP: &str = r#"{
        "eventGroup": {
            "eventGroupId": 42133,
            "name": "NHL",
            "events": [
                {"eventId": 180001, "name": "BOS Bruins @ TOR Maple Leafs"},
                {"eventId": 180002, "name": "NY Rangers @ MTL Canadiens"}
            ],
            "offerCategories": [{
                "offerCategoryId": 492,
                "name": "Game Lines",
                "offerSubcategoryDescriptors": [{
                    "subcategoryId": 4525,
                    "name": "Game",
                    "offerSubcategory": {
                        "offers": [
                            [
                                {"label": "Puck Line", "eventId": 180001, "outcomes": [
                                    {"label": "BOS Bruins", "line": 1.5, "oddsDecimal": 1.45},
                                    {"label": "TOR Maple Leafs", "line": -1.5, "oddsDecimal": 2.75}
                                ]},
                                {"label": "Total", "eventId": 180001, "outcomes": [
                                    {"label": "Over", "line": 6.5, "oddsDecimal": 2.05},
                                    {"label": "Under", "line": 6.5, "oddsDecimal": 1.80}
                                ]},
                                {"label": "Moneyline", "eventId": 180001, "outcomes": [
                                    {"label": "BOS Bruins", "oddsDecimal": 2.20},
                                    {"label": "TOR Maple Leafs", "oddsDecimal": 1.70}
                                ]}
                            ],
                            [
                                {"eventId": 180002, "outcomes": []},
                                {"label": "Moneyline", "eventId": 180002, "outcomes": [
                                    {"label": "NY Rangers", "oddsDecimal": 1.95},
                                    {"label": "MTL Canadiens", "oddsDecimal": 1.90}
                                ]}
                            ]
                        ]
                    }
                }]
            }]
        }
    }"#;
}
