/// Client reconciliation window
///
/// The bounded, newest-first buffer an observer maintains by merging the
/// initial snapshot with streamed records. Two states: Uninitialized
/// until a snapshot arrives, Ready afterwards. Streamed records are
/// prepended; everything beyond the capacity is discarded, not archived.
use crate::store::Detection;
use std::collections::VecDeque;

/// Window lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No snapshot applied yet
    Uninitialized,

    /// Snapshot applied; live records merge into it
    Ready,
}

/// Bounded newest-first record buffer for one observer
#[derive(Debug)]
pub struct DetectionWindow {
    entries: VecDeque<Detection>,
    capacity: usize,
    state: WindowState,
}

impl DetectionWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            state: WindowState::Uninitialized,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == WindowState::Ready
    }

    /// Apply the snapshot (already newest-first) and become Ready.
    ///
    /// Replaces the current contents: records streamed in before the
    /// snapshot response landed are superseded by it.
    pub fn apply_snapshot(&mut self, records: Vec<Detection>) {
        self.entries = records.into_iter().take(self.capacity).collect();
        self.state = WindowState::Ready;
    }

    /// Prepend one streamed record and truncate to capacity
    pub fn push_live(&mut self, record: Detection) {
        self.entries.push_front(record);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records newest-first
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.entries.iter()
    }

    /// The most recent record, if any
    pub fn newest(&self) -> Option<&Detection> {
        self.entries.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::BoundingBox;

    fn det(id: i64, timestamp: &str) -> Detection {
        Detection {
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
        }
    }

    #[test]
    fn test_snapshot_initializes_window() {
        let mut window = DetectionWindow::new(50);
        assert_eq!(window.state(), WindowState::Uninitialized);

        window.apply_snapshot(vec![
            det(3, "2026-08-06T10:00:03Z"),
            det(2, "2026-08-06T10:00:02Z"),
            det(1, "2026-08-06T10:00:01Z"),
        ]);

        assert!(window.is_ready());
        assert_eq!(window.len(), 3);
        assert_eq!(window.newest().unwrap().id, 3);
    }

    #[test]
    fn test_live_record_prepends() {
        // Snapshot [t3,t2,t1] + streamed t4 yields [t4,t3,t2,t1]
        let mut window = DetectionWindow::new(50);
        window.apply_snapshot(vec![
            det(3, "2026-08-06T10:00:03Z"),
            det(2, "2026-08-06T10:00:02Z"),
            det(1, "2026-08-06T10:00:01Z"),
        ]);

        window.push_live(det(4, "2026-08-06T10:00:04Z"));

        let ids: Vec<i64> = window.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        // A full window plus one more record evicts the oldest
        let mut window = DetectionWindow::new(50);
        let snapshot: Vec<Detection> = (1..=50)
            .rev()
            .map(|i| det(i, &format!("2026-08-06T10:00:{:02}Z", i)))
            .collect();
        window.apply_snapshot(snapshot);
        assert_eq!(window.len(), 50);

        window.push_live(det(51, "2026-08-06T10:00:51Z"));

        assert_eq!(window.len(), 50);
        assert_eq!(window.newest().unwrap().id, 51);
        // The oldest (id 1) fell off the tail
        assert!(window.iter().all(|d| d.id != 1));
    }

    #[test]
    fn test_oversized_snapshot_is_truncated() {
        let mut window = DetectionWindow::new(3);
        window.apply_snapshot((1..=10).rev().map(|i| det(i, "t")).collect());
        assert_eq!(window.len(), 3);
        assert_eq!(window.newest().unwrap().id, 10);
    }

    #[test]
    fn test_snapshot_replaces_pre_snapshot_live_records() {
        let mut window = DetectionWindow::new(50);

        // Stream delivers before the snapshot response lands
        window.push_live(det(4, "2026-08-06T10:00:04Z"));
        assert_eq!(window.state(), WindowState::Uninitialized);
        assert_eq!(window.len(), 1);

        window.apply_snapshot(vec![
            det(4, "2026-08-06T10:00:04Z"),
            det(3, "2026-08-06T10:00:03Z"),
        ]);

        assert!(window.is_ready());
        let ids: Vec<i64> = window.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn test_many_streamed_records_keep_cap() {
        let mut window = DetectionWindow::new(50);
        window.apply_snapshot(Vec::new());

        for i in 0..500 {
            window.push_live(det(i, &format!("2026-08-06T10:{:02}:{:02}Z", i / 60, i % 60)));
            assert!(window.len() <= 50);
        }
        assert_eq!(window.len(), 50);
        assert_eq!(window.newest().unwrap().id, 499);
    }
}
