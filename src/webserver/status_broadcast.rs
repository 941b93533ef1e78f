/// Periodic system status broadcast
///
/// Pushes a `system.status` envelope to all connected subscribers on a
/// fixed interval so dashboards can show liveness without polling the
/// REST surface.
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{interval, Duration};

use crate::logger::{self, LogTag};
use crate::webserver::state::AppState;
use crate::webserver::ws::Topic;

/// Status snapshot payload
#[derive(Clone, Debug, Serialize)]
pub struct StatusSnapshot {
    pub uptime_seconds: u64,
    pub active_connections: usize,
    pub watermark: Option<String>,
    pub total_ticks: u64,
    pub failed_ticks: u64,
    pub records_forwarded: u64,
}

/// Build a snapshot from the current application state
pub async fn gather_snapshot(state: &AppState) -> StatusSnapshot {
    let stats = state.poller_stats.read().await.clone();
    StatusSnapshot {
        uptime_seconds: state.uptime_seconds(),
        active_connections: state.ws_hub.active_connections().await,
        watermark: state.watermark.read(),
        total_ticks: stats.total_ticks,
        failed_ticks: stats.failed_ticks,
        records_forwarded: stats.records_forwarded,
    }
}

/// Spawn the status broadcast task; `shutdown` stops it
pub fn start(state: Arc<AppState>, shutdown: Arc<Notify>) -> tokio::task::JoinHandle<()> {
    let period = state.config.webserver.websocket.status_interval_secs.max(1);
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(period));
        logger::debug(
            LogTag::Webserver,
            &format!("Status broadcast started ({}s interval)", period),
        );

        let shutdown_signal = shutdown.notified();
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                _ = &mut shutdown_signal => break,
                _ = ticker.tick() => {
                    let snapshot = gather_snapshot(&state).await;
                    match serde_json::to_value(&snapshot) {
                        Ok(data) => state.ws_hub.publish(Topic::SystemStatus, data).await,
                        Err(e) => logger::error(
                            LogTag::Webserver,
                            &format!("Failed to serialize status snapshot: {}", e),
                        ),
                    }
                }
            }
        }
    })
}
