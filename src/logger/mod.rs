//! Structured logging system for detstream
//!
//! Provides a compact logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Dual output: colored console + file persistence under logs/
//!
//! ## Usage
//!
//! ```rust
//! use detstream::logger::{self, LogTag};
//!
//! logger::error(LogTag::Store, "Query failed");
//! logger::info(LogTag::Poller, "Forwarded 3 records");
//! logger::debug(LogTag::Webserver, "Connection 4 registered"); // Only with --debug-webserver
//! ```
//!
//! Call `logger::init()` once at startup, after the logs directory exists.

mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Opens the log file under logs/. Must be called once at application
/// startup, before any logging occurs.
pub fn init() {
    file::init_file_logging();
}

/// Log with an explicit event type string (e.g. "READY", "TICK")
///
/// The event type is matched against known level names for filtering;
/// unknown types log at Info level.
pub fn log(tag: LogTag, log_type: &str, message: &str) {
    let level = LogLevel::from_str(log_type).unwrap_or(LogLevel::Info);
    core::log_internal(tag, level, log_type, message);
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, "ERROR", message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, "WARNING", message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, "INFO", message);
}

/// Log at DEBUG level (gated by --debug-<module> for the tag)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, "DEBUG", message);
}

/// Log at VERBOSE level (gated by --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, "VERBOSE", message);
}

/// Force flush pending log writes (call during shutdown)
pub fn flush() {
    file::flush_file_logging();
}
