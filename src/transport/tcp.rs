use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::broker::Broker;
use crate::client::session;
use crate::config::HeartbeatSettings;

/// Binds the listening socket and accepts connections forever. Each accepted
/// connection gets its own session task; a failed accept is logged and the
/// loop keeps going. Failure to bind is fatal.
pub async fn start_tcp_server(addr: &str, broker: Arc<Broker>, heartbeat: HeartbeatSettings) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("STOMP server listening on {}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let broker = broker.clone();
                tokio::spawn(async move {
                    session::run(stream, broker, heartbeat).await;
                });
            }
            Err(err) => {
                warn!("Failed to accept connection: {}", err);
            }
        }
    }
}
