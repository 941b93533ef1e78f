/// WebSocket fan-out module
///
/// A single /ws endpoint carries all real-time data. The hub is the
/// broker: it owns the subscriber registry and pushes topic-tagged
/// envelopes into bounded per-connection queues. Delivery failures are
/// isolated per subscriber; late joiners catch up via the snapshot
/// endpoint rather than replay.
///
/// ## Components
/// - `hub`: subscriber registry, sequence stamping, broadcast
/// - `connection`: per-socket lifecycle and control messages
/// - `message`: envelope and control message schemas
/// - `health`: heartbeat and idle tracking
/// - `metrics`: hub and per-connection counters
pub mod connection;
pub mod health;
pub mod hub;
pub mod message;
pub mod metrics;

pub use hub::WsHub;
pub use message::{ClientMessage, ServerMessage, Topic, WsEnvelope};
