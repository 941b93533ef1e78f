/// Status API route
///
/// Uptime, watermark position, poll loop statistics and hub metrics in
/// one place, for operators and dashboards.
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::poller::PollerStats;
use crate::webserver::state::AppState;
use crate::webserver::ws::metrics::HubMetricsSnapshot;

/// Status response structure
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: u64,
    pub watermark: Option<String>,
    pub active_connections: usize,
    pub poller: PollerStats,
    pub hub: HubMetricsSnapshot,
    pub timestamp: String,
}

/// Create status routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// Get current server status
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime_seconds: state.uptime_seconds(),
        watermark: state.watermark.read(),
        active_connections: state.ws_hub.active_connections().await,
        poller: state.poller_stats.read().await.clone(),
        hub: state.ws_hub.metrics().snapshot(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
