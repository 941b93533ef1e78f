/// Shared application state for the webserver
///
/// References to the core systems the route handlers need: the store
/// adapter for snapshots, the hub for fan-out, and the watermark and
/// poller statistics for the status surface.
use crate::config::Config;
use crate::poller::{PollerStats, Watermark};
use crate::store::DetectionStore;
use crate::webserver::ws::WsHub;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration
    pub config: Arc<Config>,

    /// Detection store adapter (read-only)
    pub store: Arc<dyn DetectionStore>,

    /// Central WebSocket hub
    pub ws_hub: Arc<WsHub>,

    /// Delivery watermark (poll loop is the only writer)
    pub watermark: Arc<Watermark>,

    /// Poll loop statistics
    pub poller_stats: Arc<RwLock<PollerStats>>,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn DetectionStore>,
        ws_hub: Arc<WsHub>,
        watermark: Arc<Watermark>,
        poller_stats: Arc<RwLock<PollerStats>>,
    ) -> Self {
        Self {
            config,
            store,
            ws_hub,
            watermark,
            poller_stats,
            startup_time: chrono::Utc::now(),
        }
    }

    /// Server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time).num_seconds().max(0) as u64
    }
}
