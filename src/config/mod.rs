//! The `config` module handles the application's configuration management.
//!
//! It defines the structure of the application settings, provides default
//! values, and implements the logic for loading configuration from various
//! sources, such as configuration files and environment variables.
//!
//! This module uses the `config` crate for flexible and layered configuration.

pub mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{HeartbeatSettings, ServerSettings, Settings};

/// Loads application settings from file, environment, and defaults.
///
/// Configuration values are read from:
/// 1. An optional `config/default` file (TOML/YAML/JSON).
/// 2. Environment variables with `_` separators (e.g., `SERVER_PORT`,
///    `HEARTBEAT_OUTGOING_MS`).
///
/// Missing fields are filled using the values from `Settings::default()`.
///
/// # Errors
///
/// Returns an error if the config file cannot be parsed or deserialized.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        heartbeat: HeartbeatSettings {
            outgoing_ms: partial
                .heartbeat
                .as_ref()
                .and_then(|h| h.outgoing_ms)
                .unwrap_or(default.heartbeat.outgoing_ms),
            incoming_ms: partial
                .heartbeat
                .as_ref()
                .and_then(|h| h.incoming_ms)
                .unwrap_or(default.heartbeat.incoming_ms),
        },
    })
}

#[cfg(test)]
mod tests;
