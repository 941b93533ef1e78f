/// Runtime configuration for detstream
///
/// Loaded once at startup from a TOML file (detstream.toml by default,
/// overridable with --config). Every value has a default so a missing
/// file or a partial file is fine. A handful of values can be overridden
/// from the command line (--db, --port).
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// =============================================================================
// SCHEMA
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub webserver: WebserverConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Detection store (SQLite file written by the external pipeline)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

/// Poll loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Seconds between change-detection polls
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,

    /// Maximum records fetched per poll
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Store query timeout; a timed-out query counts as a failed tick
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

/// Webserver bind address and API limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebserverConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Records returned by GET /api/detections
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: usize,

    #[serde(default)]
    pub websocket: WebsocketConfig,
}

/// WebSocket hub and connection tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsocketConfig {
    /// Per-connection queue size (messages dropped beyond this)
    #[serde(default = "default_ws_buffer_size")]
    pub buffer_size: usize,

    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,

    #[serde(default = "default_idle_timeout_secs")]
    pub client_idle_timeout_secs: u64,

    /// Seconds between system.status broadcasts
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
}

/// Observer client tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Reconciliation window capacity (K)
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
}

// =============================================================================
// DEFAULTS
// =============================================================================

fn default_db_path() -> String {
    crate::paths::get_detections_db_path()
        .to_string_lossy()
        .to_string()
}
fn default_poll_interval_secs() -> u64 {
    1
}
fn default_batch_size() -> usize {
    10
}
fn default_query_timeout_ms() -> u64 {
    5_000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_snapshot_limit() -> usize {
    50
}
fn default_ws_buffer_size() -> usize {
    64
}
fn default_heartbeat_secs() -> u64 {
    30
}
fn default_idle_timeout_secs() -> u64 {
    90
}
fn default_status_interval_secs() -> u64 {
    10
}
fn default_window_capacity() -> usize {
    50
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            batch_size: default_batch_size(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl Default for WebserverConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            snapshot_limit: default_snapshot_limit(),
            websocket: WebsocketConfig::default(),
        }
    }
}

impl Default for WebsocketConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_ws_buffer_size(),
            heartbeat_secs: default_heartbeat_secs(),
            client_idle_timeout_secs: default_idle_timeout_secs(),
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply command-line overrides (--db, --port)
    pub fn apply_cli_overrides(&mut self) {
        if let Some(db) = crate::arguments::get_arg_value("--db") {
            self.store.db_path = db;
        }
        if let Some(port) = crate::arguments::get_arg_value("--port") {
            if let Ok(port) = port.parse() {
                self.webserver.port = port;
            }
        }
    }

    /// Webserver bind address string
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.webserver.host, self.webserver.port)
    }
}

// =============================================================================
// GLOBAL ACCESS
// =============================================================================

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Initialize the global config (startup only)
pub fn init(config: Config) {
    let _ = CONFIG.set(config);
}

/// Load from --config (or the default path), apply overrides, install globally
pub fn init_from_args() -> Result<()> {
    let path = crate::arguments::get_arg_value("--config")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(crate::paths::get_config_path);
    let mut config = Config::load(&path)?;
    config.apply_cli_overrides();
    init(config);
    Ok(())
}

/// Access the global config through a closure
///
/// Falls back to defaults if init() was never called (tests, tools).
pub fn with_config<T>(f: impl FnOnce(&Config) -> T) -> T {
    match CONFIG.get() {
        Some(config) => f(config),
        None => f(&Config::default()),
    }
}
