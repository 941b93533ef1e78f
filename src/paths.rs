//! Centralized path resolution for detstream
//!
//! All file and directory paths are resolved through this module so the
//! service, the operator tools, and the tests agree on the layout.
//!
//! ## Directory Structure
//!
//! ```text
//! ./
//! ├── data/
//! │   └── detections.db   (written by the external pipeline)
//! ├── logs/
//! │   └── detstream.log
//! └── detstream.toml
//! ```

use std::path::PathBuf;

/// Data directory (detections database lives here)
pub const DATA_DIR: &str = "data";

/// Log directory
pub const LOGS_DIR: &str = "logs";

/// Default detections database filename
const DETECTIONS_DB_FILE: &str = "detections.db";

/// Default config filename
const CONFIG_FILE: &str = "detstream.toml";

/// Get the data directory path
pub fn get_data_dir() -> PathBuf {
    PathBuf::from(DATA_DIR)
}

/// Get the log directory path
pub fn get_logs_dir() -> PathBuf {
    PathBuf::from(LOGS_DIR)
}

/// Get the default detections database path
pub fn get_detections_db_path() -> PathBuf {
    get_data_dir().join(DETECTIONS_DB_FILE)
}

/// Get the default config file path
pub fn get_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}

/// Ensure all required directories exist
///
/// Must run before logger initialization (the logger needs logs/ to
/// create its file).
pub fn ensure_all_directories() -> Result<(), String> {
    for dir in [get_data_dir(), get_logs_dir()] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    }
    Ok(())
}
