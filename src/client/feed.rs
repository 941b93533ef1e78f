/// Live detection feed for an observer process
///
/// Joins the server the way the dashboard does: open the WebSocket
/// stream, fetch the snapshot over HTTP, and reconcile both into the
/// bounded window. The stream is opened first so records arriving while
/// the snapshot request is in flight are not lost; the snapshot then
/// supersedes whatever came in early.
use anyhow::{anyhow, Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::arguments::is_debug_client_enabled;
use crate::client::window::DetectionWindow;
use crate::logger::{self, LogTag};
use crate::store::Detection;

/// Observer-side feed: snapshot + stream merged through the window
pub struct LiveFeed {
    base_url: Url,
    http: reqwest::Client,
    window: DetectionWindow,
}

impl LiveFeed {
    /// `base_url` is the server's HTTP origin, e.g. http://127.0.0.1:8080
    pub fn new(base_url: &str, window_capacity: usize) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid server URL: {}", base_url))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            window: DetectionWindow::new(window_capacity),
        })
    }

    pub fn window(&self) -> &DetectionWindow {
        &self.window
    }

    /// Fetch the snapshot and initialize the window
    pub async fn fetch_snapshot(&mut self) -> Result<usize> {
        let url = self
            .base_url
            .join("/api/detections")
            .context("Failed to build snapshot URL")?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Snapshot request failed")?;

        if !response.status().is_success() {
            // The server reports store failures as an error status,
            // distinct from an empty list
            return Err(anyhow!(
                "Snapshot request rejected with status {}",
                response.status()
            ));
        }

        let records: Vec<Detection> = response
            .json()
            .await
            .context("Failed to parse snapshot response")?;
        let count = records.len();
        self.window.apply_snapshot(records);

        if is_debug_client_enabled() {
            logger::debug(
                LogTag::Client,
                &format!("Snapshot applied ({} records)", count),
            );
        }
        Ok(count)
    }

    /// Connect the stream, reconcile it into the window, and call
    /// `on_update` after every window change. Returns when the server
    /// closes the connection.
    pub async fn run<F>(&mut self, mut on_update: F) -> Result<()>
    where
        F: FnMut(&DetectionWindow),
    {
        let ws_url = self.ws_url()?;
        let (ws_stream, _) = connect_async(ws_url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", ws_url))?;
        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let hello = serde_json::json!({"type": "hello", "client_id": "tool_watch_detections"});
        ws_tx
            .send(Message::Text(hello.to_string()))
            .await
            .context("Failed to send hello")?;

        // Stream is live; now take the snapshot. Anything streamed in
        // the meantime is superseded by it.
        self.fetch_snapshot().await?;
        on_update(&self.window);

        while let Some(msg) = ws_rx.next().await {
            match msg.context("WebSocket stream error")? {
                Message::Text(text) => {
                    if let Some(detection) = parse_live_detection(&text) {
                        self.window.push_live(detection);
                        on_update(&self.window);
                    }
                }
                Message::Ping(payload) => {
                    ws_tx
                        .send(Message::Pong(payload))
                        .await
                        .context("Failed to answer ping")?;
                }
                Message::Close(_) => {
                    logger::info(LogTag::Client, "Server closed the stream");
                    break;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn ws_url(&self) -> Result<Url> {
        let mut url = self
            .base_url
            .join("/ws")
            .context("Failed to build stream URL")?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| anyhow!("Failed to set websocket scheme"))?;
        Ok(url)
    }
}

/// Extract a Detection from a server message, if it is one
///
/// Only `detections.new` data envelopes yield a record; control
/// messages (ack/pong) and other topics are ignored.
fn parse_live_detection(text: &str) -> Option<Detection> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    if value.get("type")?.as_str()? != "data" {
        return None;
    }
    if value.get("t")?.as_str()? != "detections.new" {
        return None;
    }
    serde_json::from_value(value.get("data")?.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webserver::ws::{ServerMessage, Topic, WsEnvelope};

    #[test]
    fn test_parse_live_detection_from_envelope() {
        let detection = serde_json::json!({
            "id": 7,
            "timestamp": "2026-08-06T10:00:00Z",
            "label": "person",
            "confidence": 0.9,
            "bbox": {"xmin": 0.0, "ymin": 0.0, "xmax": 10.0, "ymax": 10.0},
            "source": "cam-1"
        });
        let msg = ServerMessage::Data(WsEnvelope::new(Topic::DetectionsNew, 0, detection));

        let parsed = parse_live_detection(&msg.to_json().unwrap()).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.label, "person");
    }

    #[test]
    fn test_other_messages_are_ignored() {
        // Status envelope: right shape, wrong topic
        let status = ServerMessage::Data(WsEnvelope::new(
            Topic::SystemStatus,
            0,
            serde_json::json!({"uptime_seconds": 5}),
        ));
        assert!(parse_live_detection(&status.to_json().unwrap()).is_none());

        // Control message
        let pong = ServerMessage::Pong { id: None };
        assert!(parse_live_detection(&pong.to_json().unwrap()).is_none());

        // Garbage
        assert!(parse_live_detection("not json").is_none());
    }

    #[test]
    fn test_ws_url_derivation() {
        let feed = LiveFeed::new("http://127.0.0.1:8080", 50).unwrap();
        assert_eq!(feed.ws_url().unwrap().as_str(), "ws://127.0.0.1:8080/ws");

        let feed = LiveFeed::new("https://example.com", 50).unwrap();
        assert_eq!(feed.ws_url().unwrap().as_str(), "wss://example.com/ws");
    }
}
