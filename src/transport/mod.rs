//! The `transport` module is responsible for network communication with
//! clients over plain TCP.
//!
//! It owns the listening socket and the accept loop; everything after the
//! accept (framing, negotiation, dispatch) happens in the per-connection
//! session spawned for each client.

pub mod tcp;
