//! Observer-side reconciliation
//!
//! What a dashboard does with the server's two surfaces: fetch the
//! snapshot once, follow the stream, and keep a bounded newest-first
//! window of both. The window is plain state with no I/O; the feed
//! wires it to HTTP + WebSocket for observer processes.

pub mod feed;
pub mod window;

pub use feed::LiveFeed;
pub use window::{DetectionWindow, WindowState};
