/// Core logging logic: level filtering, then delegation to the format
/// module for output.
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Debug level requires --debug-<module> for the tag
/// 3. Verbose level requires --verbose
use super::format::format_and_log;
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::is_verbose_enabled;

/// Check if a log message should be displayed
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    match level {
        LogLevel::Error | LogLevel::Warning | LogLevel::Info => true,
        LogLevel::Debug => tag.debug_enabled() || is_verbose_enabled(),
        LogLevel::Verbose => is_verbose_enabled(),
    }
}

/// Internal logging entry point with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, log_type: &str, message: &str) {
    if !should_log(&tag, level) {
        return;
    }
    format_and_log(tag, level, log_type, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_gating() {
        assert!(should_log(&LogTag::Store, LogLevel::Error));
        assert!(should_log(&LogTag::Store, LogLevel::Warning));
        assert!(should_log(&LogTag::Poller, LogLevel::Info));

        // No --debug-client / --verbose flag in the test harness args
        assert!(!should_log(&LogTag::Client, LogLevel::Debug));
        assert!(!should_log(&LogTag::Client, LogLevel::Verbose));
    }
}
