/// SQLite-backed detection store adapter
///
/// The database file is written by the external pipeline; detstream only
/// reads it. Schema creation is idempotent so either side can start
/// first. Queries are keyset-style on the timestamp column, which the
/// pipeline indexes descending.
use crate::errors::StoreError;
use crate::logger::{self, LogTag};
use crate::store::models::{BoundingBox, Detection};
use crate::store::DetectionStore;
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

/// SQLite store adapter
pub struct SqliteDetectionStore {
    conn: Mutex<Connection>,
}

impl SqliteDetectionStore {
    /// Open (or create) the detections database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;

        logger::debug(
            LogTag::Store,
            &format!("Detections store opened at {}", path.display()),
        );
        Ok(store)
    }

    /// Create the detections table and timestamp index if absent
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS detections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                label TEXT NOT NULL,
                confidence REAL NOT NULL,
                xmin REAL NOT NULL,
                ymin REAL NOT NULL,
                xmax REAL NOT NULL,
                ymax REAL NOT NULL,
                source TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_detections_timestamp
                ON detections (timestamp DESC);",
        )?;
        Ok(())
    }

    fn row_to_detection(row: &Row) -> rusqlite::Result<Detection> {
        Ok(Detection {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            label: row.get(2)?,
            confidence: row.get(3)?,
            bbox: BoundingBox {
                xmin: row.get(4)?,
                ymin: row.get(5)?,
                xmax: row.get(6)?,
                ymax: row.get(7)?,
            },
            source: row.get(8)?,
        })
    }

    /// Synchronous query body shared by the trait methods
    ///
    /// Equal timestamps are tie-broken by insertion order (rowid) so the
    /// observed store order is deterministic.
    fn query_since_sync(&self, since: Option<&str>, limit: usize) -> Result<Vec<Detection>> {
        let conn = self.conn.lock().unwrap();

        let mut detections = Vec::new();
        match since {
            Some(since) => {
                let mut stmt = conn.prepare(
                    "SELECT id, timestamp, label, confidence, xmin, ymin, xmax, ymax, source
                     FROM detections
                     WHERE timestamp > ?1
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![since, limit as i64], Self::row_to_detection)?;
                for row in rows {
                    detections.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, timestamp, label, confidence, xmin, ymin, xmax, ymax, source
                     FROM detections
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit as i64], Self::row_to_detection)?;
                for row in rows {
                    detections.push(row?);
                }
            }
        }

        Ok(detections)
    }
}

#[async_trait]
impl DetectionStore for SqliteDetectionStore {
    async fn query_since(
        &self,
        since: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Detection>, StoreError> {
        self.query_since_sync(since, limit)
            .map_err(|e| StoreError::Unavailable {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Insert a detection the way the external pipeline would.
    /// Returns the store-assigned id.
    pub fn insert_detection(
        store: &SqliteDetectionStore,
        timestamp: &str,
        label: &str,
        confidence: f64,
        source: &str,
    ) -> i64 {
        let conn = store.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO detections
                (timestamp, label, confidence, xmin, ymin, xmax, ymax, source)
             VALUES (?1, ?2, ?3, 0.0, 0.0, 100.0, 100.0, ?4)",
            params![timestamp, label, confidence, source],
        )
        .unwrap();
        conn.last_insert_rowid()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::insert_detection;
    use super::*;
    use tempfile::tempdir;

    fn open_temp_store() -> (tempfile::TempDir, SqliteDetectionStore) {
        let dir = tempdir().unwrap();
        let store = SqliteDetectionStore::open(&dir.path().join("detections.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_not_error() {
        let (_dir, store) = open_temp_store();
        let result = store.query_since(None, 10).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first() {
        // Records at t1..t3; the snapshot returns [t3, t2, t1]
        let (_dir, store) = open_temp_store();
        insert_detection(&store, "2026-08-06T10:00:01Z", "person", 0.9, "cam-1");
        insert_detection(&store, "2026-08-06T10:00:02Z", "car", 0.8, "cam-1");
        insert_detection(&store, "2026-08-06T10:00:03Z", "dog", 0.7, "cam-1");

        let result = store.recent(50).await.unwrap();
        let timestamps: Vec<&str> = result.iter().map(|d| d.timestamp.as_str()).collect();
        assert_eq!(
            timestamps,
            vec![
                "2026-08-06T10:00:03Z",
                "2026-08-06T10:00:02Z",
                "2026-08-06T10:00:01Z"
            ]
        );
    }

    #[tokio::test]
    async fn test_query_since_is_strictly_greater() {
        let (_dir, store) = open_temp_store();
        insert_detection(&store, "2026-08-06T10:00:01Z", "person", 0.9, "cam-1");
        insert_detection(&store, "2026-08-06T10:00:02Z", "car", 0.8, "cam-1");

        let result = store
            .query_since(Some("2026-08-06T10:00:01Z"), 10)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, "car");

        let result = store
            .query_since(Some("2026-08-06T10:00:02Z"), 10)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_limit_caps_result() {
        let (_dir, store) = open_temp_store();
        for i in 0..20 {
            insert_detection(
                &store,
                &format!("2026-08-06T10:00:{:02}Z", i),
                "person",
                0.9,
                "cam-1",
            );
        }

        let result = store.query_since(None, 10).await.unwrap();
        assert_eq!(result.len(), 10);
        // Newest 10, not oldest 10
        assert_eq!(result[0].timestamp, "2026-08-06T10:00:19Z");
    }

    #[tokio::test]
    async fn test_equal_timestamps_tie_break_by_insertion() {
        let (_dir, store) = open_temp_store();
        let first = insert_detection(&store, "2026-08-06T10:00:00Z", "person", 0.9, "cam-1");
        let second = insert_detection(&store, "2026-08-06T10:00:00Z", "car", 0.8, "cam-1");

        let result = store.recent(10).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, second);
        assert_eq!(result[1].id, first);
    }

    #[tokio::test]
    async fn test_round_trips_full_record() {
        let (_dir, store) = open_temp_store();
        insert_detection(&store, "2026-08-06T10:00:00Z", "bicycle", 0.42, "cam-7");

        let result = store.recent(1).await.unwrap();
        let det = &result[0];
        assert_eq!(det.label, "bicycle");
        assert_eq!(det.source, "cam-7");
        assert!(det.is_valid());
    }
}
