/// Detection poll loop
///
/// Fixed-interval change detection against the store: each tick queries
/// for records newer than the watermark, advances the watermark to the
/// batch maximum, and forwards the batch to the WebSocket hub in
/// ascending timestamp order so prepend-based observers end up
/// newest-first. Ticks are strictly serialized; a slow query defers the
/// next tick instead of overlapping it.
///
/// A failed or timed-out query leaves the watermark unchanged, so the
/// same window is re-queried next tick (at-least-once redelivery).
use crate::arguments::is_debug_poller_enabled;
use crate::config::PollerConfig;
use crate::errors::StoreError;
use crate::logger::{self, LogTag};
use crate::store::DetectionStore;
use crate::webserver::ws::{Topic, WsHub};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::time::MissedTickBehavior;

pub mod watermark;

pub use watermark::Watermark;

// =============================================================================
// STATISTICS
// =============================================================================

/// Poll loop statistics, exposed over the status surface
#[derive(Debug, Clone, Serialize)]
pub struct PollerStats {
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub records_forwarded: u64,
    pub last_tick: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for PollerStats {
    fn default() -> Self {
        Self {
            total_ticks: 0,
            successful_ticks: 0,
            failed_ticks: 0,
            records_forwarded: 0,
            last_tick: None,
            last_error: None,
        }
    }
}

impl PollerStats {
    pub fn record_success(&mut self, forwarded: usize) {
        self.total_ticks += 1;
        self.successful_ticks += 1;
        self.records_forwarded += forwarded as u64;
        self.last_tick = Some(Utc::now());
    }

    pub fn record_failure(&mut self, error: String) {
        self.total_ticks += 1;
        self.failed_ticks += 1;
        self.last_tick = Some(Utc::now());
        self.last_error = Some(error);
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Periodic store poller feeding the WebSocket hub
pub struct DetectionPoller {
    store: Arc<dyn DetectionStore>,
    hub: Arc<WsHub>,
    watermark: Arc<Watermark>,
    stats: Arc<RwLock<PollerStats>>,
    config: PollerConfig,
}

impl DetectionPoller {
    pub fn new(
        store: Arc<dyn DetectionStore>,
        hub: Arc<WsHub>,
        watermark: Arc<Watermark>,
        config: PollerConfig,
    ) -> Self {
        Self {
            store,
            hub,
            watermark,
            stats: Arc::new(RwLock::new(PollerStats::default())),
            config,
        }
    }

    /// Shared stats handle for the status surface
    pub fn stats(&self) -> Arc<RwLock<PollerStats>> {
        Arc::clone(&self.stats)
    }

    /// Run one poll tick: query, advance watermark, forward batch
    pub async fn poll_once(&self) {
        let since = self.watermark.read();

        let query = self
            .store
            .query_since(since.as_deref(), self.config.batch_size);
        let timeout = Duration::from_millis(self.config.query_timeout_ms);
        let result = match tokio::time::timeout(timeout, query).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                timeout_ms: self.config.query_timeout_ms,
            }),
        };

        match result {
            Ok(batch) => {
                if batch.is_empty() {
                    self.stats.write().await.record_success(0);
                    return;
                }

                // Batch is sorted descending; its head is the maximum
                let newest = batch[0].timestamp.clone();
                self.watermark.advance(&newest);

                // Forward ascending: the newest record must arrive last
                // for prepend-based reconciliation on the client.
                for detection in batch.iter().rev() {
                    match serde_json::to_value(detection) {
                        Ok(data) => self.hub.publish(Topic::DetectionsNew, data).await,
                        Err(e) => logger::error(
                            LogTag::Poller,
                            &format!("Failed to serialize detection {}: {}", detection.id, e),
                        ),
                    }
                }

                if is_debug_poller_enabled() {
                    logger::debug(
                        LogTag::Poller,
                        &format!(
                            "Forwarded {} record(s), watermark now {}",
                            batch.len(),
                            newest
                        ),
                    );
                }
                self.stats.write().await.record_success(batch.len());
            }
            Err(e) => {
                // Watermark untouched: the same window is retried next tick
                logger::warning(LogTag::Poller, &format!("Poll tick failed: {}", e));
                self.stats.write().await.record_failure(e.to_string());
            }
        }
    }

    /// Spawn the poll loop task; `shutdown` stops it
    pub fn spawn(self: Arc<Self>, shutdown: Arc<Notify>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    async fn run(&self, shutdown: Arc<Notify>) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.interval_secs.max(1)));
        // A tick that outlives its interval defers the next tick; ticks
        // never overlap and never get skipped.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        logger::info(
            LogTag::Poller,
            &format!(
                "🔁 Poll loop started (interval={}s, batch={})",
                self.config.interval_secs, self.config.batch_size
            ),
        );

        // Pinned once so a notification arriving mid-tick is still seen
        // on the next loop iteration
        let shutdown_signal = shutdown.notified();
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                _ = &mut shutdown_signal => {
                    logger::info(LogTag::Poller, "Poll loop stopped");
                    break;
                }
                _ = interval.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{BoundingBox, Detection};
    use std::sync::Mutex;

    /// In-memory store with the adapter's query semantics, plus a
    /// failure switch and a record of the last `since` argument.
    struct MockStore {
        records: Mutex<Vec<Detection>>,
        fail_next: Mutex<bool>,
        last_since: Mutex<Option<Option<String>>>,
    }

    impl MockStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
                fail_next: Mutex::new(false),
                last_since: Mutex::new(None),
            })
        }

        fn add(&self, id: i64, timestamp: &str) {
            self.records.lock().unwrap().push(Detection {
                id,
                timestamp: timestamp.to_string(),
                label: "person".to_string(),
                confidence: 0.9,
                bbox: BoundingBox {
                    xmin: 0.0,
                    ymin: 0.0,
                    xmax: 10.0,
                    ymax: 10.0,
                },
                source: "cam-1".to_string(),
            });
        }

        fn fail_next_query(&self) {
            *self.fail_next.lock().unwrap() = true;
        }

        fn last_since(&self) -> Option<Option<String>> {
            self.last_since.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl DetectionStore for MockStore {
        async fn query_since(
            &self,
            since: Option<&str>,
            limit: usize,
        ) -> Result<Vec<Detection>, StoreError> {
            *self.last_since.lock().unwrap() = Some(since.map(|s| s.to_string()));

            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(StoreError::Unavailable {
                    reason: "mock store down".to_string(),
                });
            }

            let mut matching: Vec<Detection> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|d| since.map_or(true, |s| d.timestamp.as_str() > s))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
            matching.truncate(limit);
            Ok(matching)
        }
    }

    fn poller_with(store: Arc<MockStore>, hub: Arc<WsHub>) -> DetectionPoller {
        DetectionPoller::new(
            store,
            hub,
            Arc::new(Watermark::new()),
            PollerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_first_poll_delivers_latest_batch_and_sets_watermark() {
        let store = MockStore::new();
        store.add(1, "2026-08-06T10:00:01Z");
        store.add(2, "2026-08-06T10:00:02Z");
        store.add(3, "2026-08-06T10:00:03Z");

        let hub = WsHub::new(16);
        let (_conn, mut rx) = hub.register_connection().await;

        let poller = poller_with(store, Arc::clone(&hub));
        poller.poll_once().await;

        assert_eq!(
            poller.watermark.read().as_deref(),
            Some("2026-08-06T10:00:03Z")
        );

        // Ascending delivery: the newest record arrives last
        let mut seen = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            seen.push(envelope.data["timestamp"].as_str().unwrap().to_string());
        }
        assert_eq!(
            seen,
            vec![
                "2026-08-06T10:00:01Z",
                "2026-08-06T10:00:02Z",
                "2026-08-06T10:00:03Z"
            ]
        );
    }

    #[tokio::test]
    async fn test_new_record_after_watermark_is_forwarded_once() {
        // Watermark at t3, store gains t4
        let store = MockStore::new();
        store.add(1, "2026-08-06T10:00:01Z");
        store.add(2, "2026-08-06T10:00:02Z");
        store.add(3, "2026-08-06T10:00:03Z");

        let hub = WsHub::new(16);
        let poller = poller_with(Arc::clone(&store), Arc::clone(&hub));
        poller.poll_once().await;

        let (_conn, mut rx) = hub.register_connection().await;
        store.add(4, "2026-08-06T10:00:04Z");
        poller.poll_once().await;

        assert_eq!(
            poller.watermark.read().as_deref(),
            Some("2026-08-06T10:00:04Z")
        );
        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.data["timestamp"], "2026-08-06T10:00:04Z");
        assert!(rx.try_recv().is_err(), "t4 must be delivered exactly once");

        // An idle follow-up poll forwards nothing
        poller.poll_once().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_tick_leaves_watermark_and_retries_same_window() {
        // A failure leaves the watermark; the next tick re-queries it
        let store = MockStore::new();
        store.add(1, "2026-08-06T10:00:01Z");

        let hub = WsHub::new(16);
        let poller = poller_with(Arc::clone(&store), hub);
        poller.poll_once().await;
        assert_eq!(
            poller.watermark.read().as_deref(),
            Some("2026-08-06T10:00:01Z")
        );

        store.fail_next_query();
        poller.poll_once().await;
        assert_eq!(
            poller.watermark.read().as_deref(),
            Some("2026-08-06T10:00:01Z"),
            "failed tick must not move the watermark"
        );

        poller.poll_once().await;
        assert_eq!(
            store.last_since(),
            Some(Some("2026-08-06T10:00:01Z".to_string())),
            "retry must re-query the unchanged window"
        );

        let stats = poller.stats.read().await.clone();
        assert_eq!(stats.failed_ticks, 1);
        assert_eq!(stats.total_ticks, 3);
        assert!(stats.last_error.unwrap().contains("mock store down"));
    }

    #[tokio::test]
    async fn test_empty_poll_keeps_watermark() {
        let store = MockStore::new();
        let hub = WsHub::new(16);
        let poller = poller_with(store, hub);

        poller.poll_once().await;
        assert_eq!(poller.watermark.read(), None);

        let stats = poller.stats.read().await.clone();
        assert_eq!(stats.successful_ticks, 1);
        assert_eq!(stats.records_forwarded, 0);
    }
}
