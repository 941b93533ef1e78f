/// Central WebSocket hub - subscriber registry and broadcaster
///
/// The hub owns the set of active subscriber connections. `publish`
/// stamps a per-topic sequence number and delivers the envelope to every
/// connection registered at the moment of the call; the registry is
/// read-locked for the enumeration, so a concurrent join is either fully
/// visible or fully absent to that publish, never partially. A failed
/// delivery (closed or full queue) is isolated to its subscriber.
///
/// The hub does no buffering or replay; a late joiner catches up through
/// the snapshot endpoint.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::arguments::is_debug_webserver_enabled;
use crate::errors::DeliveryError;
use crate::logger::{self, LogTag};

use super::message::{Topic, WsEnvelope};
use super::metrics::HubMetrics;

/// Connection ID (unique per WebSocket connection)
pub type ConnectionId = u64;

/// Per-connection sender (bounded queue)
pub type ConnectionSender = mpsc::Sender<WsEnvelope>;

/// Central WebSocket hub
pub struct WsHub {
    /// Active connections (connection_id → sender)
    connections: RwLock<HashMap<ConnectionId, ConnectionSender>>,

    /// Next connection ID
    next_conn_id: AtomicU64,

    /// Per-topic sequence counters
    detections_seq: AtomicU64,
    status_seq: AtomicU64,

    /// Hub metrics
    metrics: Arc<HubMetrics>,

    /// Per-connection queue size
    buffer_size: usize,
}

impl WsHub {
    pub fn new(buffer_size: usize) -> Arc<Self> {
        Arc::new(Self {
            connections: RwLock::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
            detections_seq: AtomicU64::new(0),
            status_seq: AtomicU64::new(0),
            metrics: HubMetrics::new(),
            buffer_size,
        })
    }

    /// Next sequence number for a topic
    pub fn next_seq(&self, topic: Topic) -> u64 {
        let counter = match topic {
            Topic::DetectionsNew => &self.detections_seq,
            Topic::SystemStatus => &self.status_seq,
        };
        counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Register a new connection, returning its id and queue receiver
    pub async fn register_connection(&self) -> (ConnectionId, mpsc::Receiver<WsEnvelope>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(self.buffer_size);

        self.connections.write().await.insert(conn_id, tx);
        self.metrics.connection_opened();

        if is_debug_webserver_enabled() {
            logger::debug(
                LogTag::Webserver,
                &format!(
                    "Hub: connection {} registered (active={})",
                    conn_id,
                    self.connections.read().await.len()
                ),
            );
        }

        (conn_id, rx)
    }

    /// Unregister a connection
    pub async fn unregister_connection(&self, conn_id: ConnectionId) {
        self.connections.write().await.remove(&conn_id);
        self.metrics.connection_closed();

        if is_debug_webserver_enabled() {
            logger::debug(
                LogTag::Webserver,
                &format!(
                    "Hub: connection {} unregistered (active={})",
                    conn_id,
                    self.connections.read().await.len()
                ),
            );
        }
    }

    /// Stamp a sequence number and broadcast a payload on a topic
    pub async fn publish(&self, topic: Topic, data: serde_json::Value) {
        let seq = self.next_seq(topic);
        self.broadcast(WsEnvelope::new(topic, seq, data)).await;
    }

    /// Deliver an envelope to every currently registered connection
    pub async fn broadcast(&self, envelope: WsEnvelope) {
        let connections = self.connections.read().await;
        if connections.is_empty() {
            return;
        }

        let mut sent = 0u64;
        let mut dropped = 0u64;

        for (conn_id, sender) in connections.iter() {
            match sender.try_send(envelope.clone()) {
                Ok(_) => {
                    sent += 1;
                    self.metrics.message_sent();
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    dropped += 1;
                    self.metrics.message_dropped(1);
                    let err = DeliveryError::QueueFull { conn_id: *conn_id };
                    logger::warning(LogTag::Webserver, &err.to_string());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Connection going away; the handler unregisters it
                    dropped += 1;
                    self.metrics.message_dropped(1);
                    if is_debug_webserver_enabled() {
                        let err = DeliveryError::SubscriberGone { conn_id: *conn_id };
                        logger::debug(LogTag::Webserver, &err.to_string());
                    }
                }
            }
        }

        if is_debug_webserver_enabled() && (sent > 0 || dropped > 0) {
            logger::debug(
                LogTag::Webserver,
                &format!(
                    "Hub: broadcast {} (sent={}, dropped={})",
                    envelope.t, sent, dropped
                ),
            );
        }
    }

    pub fn metrics(&self) -> Arc<HubMetrics> {
        Arc::clone(&self.metrics)
    }

    pub async fn active_connections(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_registration() {
        let hub = WsHub::new(10);

        let (conn_id1, _rx1) = hub.register_connection().await;
        let (conn_id2, _rx2) = hub.register_connection().await;

        assert_eq!(hub.active_connections().await, 2);
        assert_ne!(conn_id1, conn_id2);

        hub.unregister_connection(conn_id1).await;
        assert_eq!(hub.active_connections().await, 1);
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let hub = WsHub::new(10);

        let (_c1, mut rx1) = hub.register_connection().await;
        let (_c2, mut rx2) = hub.register_connection().await;

        hub.publish(Topic::DetectionsNew, serde_json::json!({"label": "person"}))
            .await;

        for rx in [&mut rx1, &mut rx2] {
            let envelope = rx.recv().await.unwrap();
            assert_eq!(envelope.t, "detections.new");
            assert_eq!(envelope.data["label"], "person");
        }
    }

    #[tokio::test]
    async fn test_late_joiner_misses_earlier_publish() {
        let hub = WsHub::new(10);

        hub.publish(Topic::DetectionsNew, serde_json::json!({"id": 1}))
            .await;

        let (_conn, mut rx) = hub.register_connection().await;
        assert!(rx.try_recv().is_err(), "no replay inside the fan-out");
    }

    #[tokio::test]
    async fn test_dead_subscriber_does_not_block_others() {
        let hub = WsHub::new(10);

        let (_gone, rx_gone) = hub.register_connection().await;
        let (_live, mut rx_live) = hub.register_connection().await;

        // Subscriber vanishes without unregistering
        drop(rx_gone);

        hub.publish(Topic::DetectionsNew, serde_json::json!({"id": 1}))
            .await;

        let envelope = rx_live.recv().await.unwrap();
        assert_eq!(envelope.data["id"], 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_for_that_subscriber_only() {
        let hub = WsHub::new(1);

        let (_slow, mut rx_slow) = hub.register_connection().await;
        let (_fast, mut rx_fast) = hub.register_connection().await;

        hub.publish(Topic::DetectionsNew, serde_json::json!({"id": 1}))
            .await;

        // Fast subscriber drains its queue; the slow one does not
        assert_eq!(rx_fast.recv().await.unwrap().data["id"], 1);

        hub.publish(Topic::DetectionsNew, serde_json::json!({"id": 2}))
            .await;

        // The slow subscriber's full queue dropped id 2; the fast one
        // still received it
        assert_eq!(rx_fast.recv().await.unwrap().data["id"], 2);
        assert_eq!(rx_slow.recv().await.unwrap().data["id"], 1);
        assert!(rx_slow.try_recv().is_err());
        assert_eq!(hub.metrics().snapshot().total_messages_dropped, 1);
    }

    #[tokio::test]
    async fn test_sequence_counters_are_per_topic() {
        let hub = WsHub::new(10);

        assert_eq!(hub.next_seq(Topic::DetectionsNew), 0);
        assert_eq!(hub.next_seq(Topic::DetectionsNew), 1);
        assert_eq!(hub.next_seq(Topic::SystemStatus), 0);
    }
}
