//! # stompd
//!
//! `stompd` is an in-memory STOMP 1.0/1.1/1.2 message broker built with Rust.
//! Clients open long-lived TCP connections, negotiate a protocol version, and
//! then publish frames to named destinations and/or subscribe to destinations
//! to receive what other clients publish there. There is no persistence and
//! no clustering: the server is a pub/sub fan-out.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `protocol`: the STOMP wire layer, with the command set, frame types,
//!   and the incremental parser/serializer.
//! - `broker`: the central registry of clients, subscriptions, and
//!   per-destination message queues, and the fan-out dispatcher.
//! - `client`: the per-connection session state machine and socket driver.
//! - `handlers`: one handler per STOMP command, mapping frames onto broker
//!   operations.
//! - `transport`: the TCP listener and accept loop.
//! - `config`: loading and managing server configuration.
//! - `utils`: shared utilities, such as error handling.

pub mod broker;
pub mod client;
pub mod config;
pub mod handlers;
pub mod protocol;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
