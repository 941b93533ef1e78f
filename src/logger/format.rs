//! Log formatting and output
//!
//! Handles colorized console output, aligned tag/type columns, and dual
//! output (console + file). Broken pipes are swallowed so piped commands
//! do not panic the process.

use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::Colorize;
use std::io::{stdout, ErrorKind, Write};

/// Column widths for alignment
const TAG_WIDTH: usize = 9;
const TYPE_WIDTH: usize = 8;

/// Format and output a log message
pub fn format_and_log(tag: LogTag, level: LogLevel, log_type: &str, message: &str) {
    let now = Local::now();
    let time = now.format("%H:%M:%S").to_string();

    let type_colored = match level {
        LogLevel::Error => log_type.bright_red().to_string(),
        LogLevel::Warning => log_type.bright_yellow().to_string(),
        LogLevel::Info => log_type.bright_white().to_string(),
        LogLevel::Debug => log_type.bright_blue().to_string(),
        LogLevel::Verbose => log_type.dimmed().to_string(),
    };

    let pad_tag = " ".repeat(TAG_WIDTH.saturating_sub(tag.as_str().len()));
    let pad_type = " ".repeat(TYPE_WIDTH.saturating_sub(log_type.len()));

    let console_line = format!(
        "{} [{}]{} [{}]{} {}",
        time.dimmed(),
        tag.colored(),
        pad_tag,
        type_colored,
        pad_type,
        message
    );
    print_stdout_safe(&console_line);

    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let file_line = format!("{} [{}] [{}] {}", timestamp, tag.as_str(), log_type, message);
    write_to_file(&file_line);
}

/// Print to stdout, ignoring broken pipes (e.g. `detstream | head`)
fn print_stdout_safe(line: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("{}", line);
        }
    }
}
