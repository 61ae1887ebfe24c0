//! The `broker` module is the core of the pub/sub system.
//!
//! It contains the following main components:
//!
//! - `Broker`: the process-wide registry of clients, subscriptions,
//!   per-destination inbound queues, and unacknowledged deliveries, plus the
//!   dispatcher tasks that fan published messages out to subscribers.
//! - `Message`: a message published to a destination.
//! - `Subscription`: one client's standing interest in a destination.
//!
//! The broker owns every client record; sessions talk to it through a shared
//! handle that outlives them.

pub mod engine;
pub mod message;
pub mod subscription;

pub use engine::Broker;
pub use message::{AckMode, Message};
pub use subscription::Subscription;
