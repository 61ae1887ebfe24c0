use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Aggregates the network parameters of the listener and the heart-beat
/// timings the server advertises during STOMP negotiation.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Network settings for the TCP listener.
    pub server: ServerSettings,
    /// Heart-beat pair the server advertises in `CONNECTED` frames.
    pub heartbeat: HeartbeatSettings,
}

/// Configuration settings for the server socket.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// The host address (e.g., "127.0.0.1" or "0.0.0.0") the server will bind to.
    pub host: String,
    /// The port number the server will listen on.
    pub port: u16,
}

/// The server side of STOMP heart-beat negotiation, in milliseconds.
///
/// `outgoing_ms` is the smallest interval at which the server is willing to
/// send heart-beats; `incoming_ms` is the interval it would like to receive
/// them. Zero disables the respective direction.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct HeartbeatSettings {
    pub outgoing_ms: u64,
    pub incoming_ms: u64,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub heartbeat: Option<PartialHeartbeatSettings>,
}

/// Partial server settings.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Partial heart-beat settings.
#[derive(Debug, Deserialize)]
pub struct PartialHeartbeatSettings {
    pub outgoing_ms: Option<u64>,
    pub incoming_ms: Option<u64>,
}

/// Provides default values for `Settings`.
///
/// Port 8086 is the historical default of this server; heart-beats are
/// disabled until configured.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8086,
            },
            heartbeat: HeartbeatSettings {
                outgoing_ms: 0,
                incoming_ms: 0,
            },
        }
    }
}
