/// Delivery watermark
///
/// A single cursor recording the timestamp of the most recently
/// delivered record. Owned by the poll loop (the only writer); other
/// tasks read it for the status surface. Held behind its own lock
/// rather than a process-wide static so ownership stays explicit.
use parking_lot::RwLock;

/// Monotonic single-writer cursor over record timestamps
pub struct Watermark {
    last_seen: RwLock<Option<String>>,
}

impl Watermark {
    /// Start with no lower bound: the first poll queries unconstrained
    /// and delivers the newest batch.
    pub fn new() -> Self {
        Self {
            last_seen: RwLock::new(None),
        }
    }

    /// Read the current value. Readers see the old or the new value
    /// atomically, never a partial update.
    pub fn read(&self) -> Option<String> {
        self.last_seen.read().clone()
    }

    /// Advance to `candidate` if it is strictly greater than the
    /// current value (or the value is unset). Returns whether the
    /// cursor moved; the watermark never moves backward.
    pub fn advance(&self, candidate: &str) -> bool {
        let mut last_seen = self.last_seen.write();
        match last_seen.as_deref() {
            Some(current) if candidate <= current => false,
            _ => {
                *last_seen = Some(candidate.to_string());
                true
            }
        }
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::new()
    }
}
