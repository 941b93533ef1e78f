/// Log tags identifying the originating module
///
/// Each tag maps to a --debug-<module> flag for per-module debug gating.
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Store,
    Poller,
    Webserver,
    Client,
}

impl LogTag {
    /// Plain string form (file output, debug keys)
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Store => "STORE",
            LogTag::Poller => "POLLER",
            LogTag::Webserver => "WEBSERVER",
            LogTag::Client => "CLIENT",
        }
    }

    /// Colored form for console output
    pub fn colored(&self) -> String {
        match self {
            LogTag::System => self.as_str().bright_white().to_string(),
            LogTag::Store => self.as_str().bright_yellow().to_string(),
            LogTag::Poller => self.as_str().bright_cyan().to_string(),
            LogTag::Webserver => self.as_str().bright_green().to_string(),
            LogTag::Client => self.as_str().bright_magenta().to_string(),
        }
    }

    /// Whether debug output is enabled for this tag
    pub fn debug_enabled(&self) -> bool {
        match self {
            LogTag::System => crate::arguments::is_verbose_enabled(),
            LogTag::Store => crate::arguments::is_debug_store_enabled(),
            LogTag::Poller => crate::arguments::is_debug_poller_enabled(),
            LogTag::Webserver => crate::arguments::is_debug_webserver_enabled(),
            LogTag::Client => crate::arguments::is_debug_client_enabled(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
