mod server;

pub mod routes;
pub mod state;
pub mod status_broadcast;
pub mod ws;

// Public API for starting/stopping the webserver
pub use server::{shutdown, start_server};
