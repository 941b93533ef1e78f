/// Structured error types for detstream
///
/// The dissemination core has three failure domains, none of them fatal
/// to the process: the store query path (retried on the next tick), the
/// snapshot path (surfaced to the requesting observer), and per-subscriber
/// delivery (isolated to the one subscriber).

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Store query failures are transient: the poll loop logs them, leaves
/// the watermark unchanged, and re-queries the same window next tick.
#[derive(Debug, Clone)]
pub enum StoreError {
    Unavailable {
        reason: String,
    },
    Timeout {
        timeout_ms: u64,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable { reason } => {
                write!(f, "store unavailable: {}", reason)
            }
            StoreError::Timeout { timeout_ms } => {
                write!(f, "store query timed out after {}ms", timeout_ms)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// =============================================================================
// SNAPSHOT ERRORS
// =============================================================================

/// Snapshot failures surface to the requesting observer as an explicit
/// error status, never as a silently empty result.
#[derive(Debug, Clone)]
pub enum SnapshotError {
    StoreFailed {
        reason: String,
    },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::StoreFailed { reason } => {
                write!(f, "snapshot query failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<StoreError> for SnapshotError {
    fn from(e: StoreError) -> Self {
        SnapshotError::StoreFailed {
            reason: e.to_string(),
        }
    }
}

// =============================================================================
// DELIVERY ERRORS
// =============================================================================

/// A delivery failure affects exactly one subscriber; it is counted in
/// hub metrics and never aborts delivery to the remaining subscribers.
#[derive(Debug, Clone)]
pub enum DeliveryError {
    QueueFull {
        conn_id: u64,
    },
    SubscriberGone {
        conn_id: u64,
    },
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::QueueFull { conn_id } => {
                write!(f, "subscriber {} queue full, message dropped", conn_id)
            }
            DeliveryError::SubscriberGone { conn_id } => {
                write!(f, "subscriber {} disconnected", conn_id)
            }
        }
    }
}

impl std::error::Error for DeliveryError {}
