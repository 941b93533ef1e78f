//! Detection store access
//!
//! The store is an append-only log owned by the external model pipeline;
//! this core only queries it. The `DetectionStore` trait is the seam:
//! the poll loop and the snapshot endpoint see the same contract, and a
//! store with native change notification can substitute a push-based
//! adapter here without touching either of them.

pub mod db;
pub mod models;

pub use db::SqliteDetectionStore;
pub use models::{BoundingBox, Detection};

use crate::errors::StoreError;
use async_trait::async_trait;

/// Read-only query contract over the detection store
#[async_trait]
pub trait DetectionStore: Send + Sync {
    /// Records with `timestamp > since` (all records when `since` is
    /// None), sorted descending by timestamp, at most `limit`.
    ///
    /// An empty result is Ok; only an unreachable store is an error.
    async fn query_since(
        &self,
        since: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Detection>, StoreError>;

    /// The most recent `limit` records, newest first. Equivalent to an
    /// unconstrained `query_since`; used by the snapshot surface.
    async fn recent(&self, limit: usize) -> Result<Vec<Detection>, StoreError> {
        self.query_since(None, limit).await
    }
}
