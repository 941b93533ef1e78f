/// Live detection watcher
///
/// Terminal observer for a running detstream server: joins exactly like
/// a dashboard would (snapshot + stream reconciled into the bounded
/// window) and renders the window as a table on every update.
///
/// Usage:
///   tool_watch_detections [--url http://127.0.0.1:8080] [--window 50]
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use detstream::{
    arguments,
    client::{DetectionWindow, LiveFeed},
    config,
    logger::{self, LogTag},
};

#[tokio::main]
async fn main() {
    if let Err(e) = detstream::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }
    logger::init();

    if arguments::is_help_requested() {
        println!("tool_watch_detections - live detection watcher");
        println!();
        println!("USAGE:");
        println!("    tool_watch_detections [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("    --url <url>       Server base URL (default: http://127.0.0.1:8080)");
        println!("    --window <n>      Window capacity (default: 50)");
        println!("    --debug-client    Client debug output");
        std::process::exit(0);
    }

    if let Err(e) = config::init_from_args() {
        logger::error(LogTag::Client, &format!("Configuration error: {}", e));
        std::process::exit(1);
    }

    let url = arguments::get_arg_value("--url")
        .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
    let capacity = arguments::get_arg_value("--window")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| config::with_config(|cfg| cfg.client.window_capacity));

    logger::info(
        LogTag::Client,
        &format!("👀 Watching {} (window={})", url, capacity),
    );

    let mut feed = match LiveFeed::new(&url, capacity) {
        Ok(feed) => feed,
        Err(e) => {
            logger::error(LogTag::Client, &format!("{:#}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = feed.run(render_window).await {
        logger::error(LogTag::Client, &format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Redraw the window table (newest record on top)
fn render_window(window: &DetectionWindow) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Timestamp",
        "Label",
        "Confidence",
        "Source",
        "BBox",
    ]);

    for det in window.iter() {
        table.add_row(vec![
            Cell::new(&det.timestamp),
            Cell::new(&det.label),
            Cell::new(format!("{:.2}", det.confidence)),
            Cell::new(&det.source),
            Cell::new(format!(
                "({:.0},{:.0})-({:.0},{:.0})",
                det.bbox.xmin, det.bbox.ymin, det.bbox.xmax, det.bbox.ymax
            )),
        ]);
    }

    // Clear screen and repaint
    print!("\x1B[2J\x1B[1;1H");
    println!("detstream - live detections ({} in window)", window.len());
    println!("{}", table);
}
