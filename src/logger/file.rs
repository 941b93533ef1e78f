//! File persistence for log output
//!
//! Appends every log line to logs/detstream.log. Failures to open or
//! write the file never interrupt the process; file logging silently
//! degrades to console-only.

use once_cell::sync::OnceCell;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

/// Log file name under the logs directory
const LOG_FILE_NAME: &str = "detstream.log";

static LOG_FILE: OnceCell<Mutex<File>> = OnceCell::new();

/// Open the log file for appending
///
/// Called once from logger::init(), after paths::ensure_all_directories().
pub fn init_file_logging() {
    let path = crate::paths::get_logs_dir().join(LOG_FILE_NAME);
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let _ = LOG_FILE.set(Mutex::new(file));
        }
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
        }
    }
}

/// Append a line to the log file
pub fn write_to_file(line: &str) {
    if let Some(file) = LOG_FILE.get() {
        if let Ok(mut file) = file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

/// Flush pending writes
pub fn flush_file_logging() {
    if let Some(file) = LOG_FILE.get() {
        if let Ok(mut file) = file.lock() {
            let _ = file.flush();
        }
    }
}
