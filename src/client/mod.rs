//! The `client` module represents one connected client.
//!
//! It provides the `Client` handle the broker keeps per connection (id,
//! remote address, outbound channel) and the `Session` state machine that
//! drives a single connection: version negotiation, frame-at-a-time
//! dispatch, heart-beat timing, and tear-down.

pub mod session;

pub use session::{Client, Session, SessionState};

#[cfg(test)]
mod tests;
