use std::sync::Arc;

use stompd::broker::Broker;
use stompd::config::load_config;
use stompd::transport::tcp::start_tcp_server;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize the tracing subscriber for logging
    tracing_subscriber::fmt::init();

    // Load configuration with robust error handling
    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Arc::new(Broker::new());

    // Run the server and listen for a shutdown signal
    tokio::select! {
        _ = start_tcp_server(&addr, broker, config.heartbeat) => {
            error!("STOMP server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }
}
