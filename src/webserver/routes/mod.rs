use crate::webserver::state::AppState;
use axum::Router;
use std::sync::Arc;

pub mod detections;
pub mod status;
pub mod ws;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(ws::routes())
        .nest("/api", api_routes())
        .with_state(state)
}

/// REST API routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(detections::routes())
        .merge(status::routes())
}
