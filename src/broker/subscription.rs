use crate::broker::message::AckMode;

/// A client's standing request to receive messages sent to a destination.
///
/// Subscription ids are chosen by the client and are only unique within that
/// client's connection; the broker always pairs them with the owning client
/// id. Destinations are opaque strings, and the broker does not parse their
/// structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Client-scoped subscription id (the `id` header of `SUBSCRIBE`).
    pub id: u64,
    pub client_id: u64,
    pub destination: String,
    pub ack: AckMode,
}
