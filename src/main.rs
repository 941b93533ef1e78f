use std::path::Path;
use std::sync::Arc;
use tokio::sync::Notify;

use detstream::{
    arguments::{is_help_requested, print_debug_info, print_help},
    config,
    logger::{self, LogTag},
    poller::{DetectionPoller, Watermark},
    store::SqliteDetectionStore,
    webserver::{self, state::AppState, status_broadcast},
};

/// Main entry point for detstream
///
/// Starts the detection store adapter, the poll loop, and the webserver
/// (REST snapshot + WebSocket fan-out), then blocks until shutdown.
#[tokio::main]
async fn main() {
    // Ensure all directories exist BEFORE logger initialization
    // (logger needs the logs directory to create its file)
    if let Err(e) = detstream::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    logger::init();

    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "🚀 detstream starting up...");
    print_debug_info();

    // Load configuration (defaults + detstream.toml + CLI overrides)
    if let Err(e) = config::init_from_args() {
        logger::error(LogTag::System, &format!("Configuration error: {}", e));
        std::process::exit(1);
    }
    let cfg = Arc::new(config::with_config(|c| c.clone()));

    // Open the detection store (written by the external pipeline)
    let store = match SqliteDetectionStore::open(Path::new(&cfg.store.db_path)) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            logger::error(
                LogTag::Store,
                &format!("Failed to open detections store {}: {}", cfg.store.db_path, e),
            );
            std::process::exit(1);
        }
    };
    logger::info(
        LogTag::Store,
        &format!("✅ Detections store ready at {}", cfg.store.db_path),
    );

    // Fan-out hub and poll loop
    let hub = detstream::webserver::ws::WsHub::new(cfg.webserver.websocket.buffer_size);
    let watermark = Arc::new(Watermark::new());
    let store: Arc<dyn detstream::store::DetectionStore> = store;
    let poller = Arc::new(DetectionPoller::new(
        Arc::clone(&store),
        Arc::clone(&hub),
        Arc::clone(&watermark),
        cfg.poller.clone(),
    ));
    let poller_stats = poller.stats();

    let shutdown = Arc::new(Notify::new());
    let poller_task = Arc::clone(&poller).spawn(Arc::clone(&shutdown));

    // Shared state for route handlers
    let state = Arc::new(AppState::new(
        Arc::clone(&cfg),
        store,
        Arc::clone(&hub),
        watermark,
        poller_stats,
    ));

    // Periodic system.status broadcast
    let status_task = status_broadcast::start(Arc::clone(&state), Arc::clone(&shutdown));

    // Graceful shutdown on Ctrl-C / SIGTERM
    {
        let shutdown = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || {
            shutdown.notify_waiters();
            webserver::shutdown();
        }) {
            logger::warning(
                LogTag::System,
                &format!("Failed to install signal handler: {}", e),
            );
        }
    }

    // Blocks until shutdown is triggered
    if let Err(e) = webserver::start_server(state).await {
        logger::error(LogTag::Webserver, &e);
        shutdown.notify_waiters();
    }

    // In-flight batches are not flushed; at-least-once semantics cover
    // them after restart
    let _ = poller_task.await;
    status_task.abort();

    logger::info(LogTag::System, "👋 detstream stopped");
    logger::flush();
}
