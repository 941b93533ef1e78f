/// Detections snapshot endpoint
///
/// Serves the most recent records, newest first, for an observer that
/// is just joining. A store failure is an explicit 500 with a JSON
/// body - deliberately distinct from an empty 200, so clients can tell
/// "nothing detected yet" from "store unreachable".
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::errors::SnapshotError;
use crate::logger::{self, LogTag};
use crate::store::Detection;
use crate::webserver::state::AppState;

/// Error body for failed snapshot queries
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create detections routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/detections", get(get_detections))
}

/// Get the most recent detections (snapshot for a joining observer)
///
/// Reads through the store adapter with no watermark side effects; the
/// poll loop's cursor is untouched by snapshot traffic.
async fn get_detections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Detection>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = state.config.webserver.snapshot_limit;

    match state.store.recent(limit).await {
        Ok(detections) => Ok(Json(detections)),
        Err(e) => {
            let err = SnapshotError::from(e);
            logger::error(LogTag::Webserver, &err.to_string());
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ))
        }
    }
}
