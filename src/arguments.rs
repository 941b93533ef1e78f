/// Centralized argument handling for detstream
///
/// Consolidates command-line argument parsing and debug flag checking so
/// binaries and the logger read flags from one place.
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Debug flag checking functions for all modules
/// - Unified argument parsing utilities
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by binaries and tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// These functions check for specific debug flags in the command-line arguments
// =============================================================================

/// Poll loop debug mode
pub fn is_debug_poller_enabled() -> bool {
    has_arg("--debug-poller")
}

/// Store adapter debug mode
pub fn is_debug_store_enabled() -> bool {
    has_arg("--debug-store")
}

/// Webserver and WebSocket hub debug mode
pub fn is_debug_webserver_enabled() -> bool {
    has_arg("--debug-webserver")
}

/// Observer client debug mode
pub fn is_debug_client_enabled() -> bool {
    has_arg("--debug-client")
}

/// Verbose mode (all trace output)
pub fn is_verbose_enabled() -> bool {
    has_arg("--verbose")
}

/// Help requested
pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Print help text for the main binary
pub fn print_help() {
    println!("detstream - detection event dissemination service");
    println!();
    println!("USAGE:");
    println!("    detstream [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>      Path to TOML config (default: detstream.toml)");
    println!("    --db <path>          Override detections database path");
    println!("    --port <port>        Override webserver port");
    println!("    --debug-poller       Poll loop debug output");
    println!("    --debug-store        Store adapter debug output");
    println!("    --debug-webserver    Webserver/WebSocket debug output");
    println!("    --debug-client       Observer client debug output");
    println!("    --verbose            Very detailed trace output");
    println!("    -h, --help           Show this help");
}

/// Print active debug modes at startup
pub fn print_debug_info() {
    let mut enabled: Vec<&str> = Vec::new();
    if is_debug_poller_enabled() {
        enabled.push("poller");
    }
    if is_debug_store_enabled() {
        enabled.push("store");
    }
    if is_debug_webserver_enabled() {
        enabled.push("webserver");
    }
    if is_debug_client_enabled() {
        enabled.push("client");
    }
    if !enabled.is_empty() {
        println!("Debug modes enabled: {}", enabled.join(", "));
    }
}
