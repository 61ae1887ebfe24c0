/// Acknowledgement policy for a subscription.
///
/// `Auto` performs no tracking. `Client` and `ClientIndividual` both cause
/// delivered messages to be recorded as unacknowledged; they differ in the
/// scope of an `ACK`, which is cumulative for `Client` and single-message
/// for `ClientIndividual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    #[default]
    Auto,
    Client,
    ClientIndividual,
}

impl AckMode {
    /// Maps the `ack` header value onto a mode. Anything unrecognized,
    /// including an absent header, falls back to `Auto`.
    pub fn from_header(value: Option<&str>) -> AckMode {
        match value {
            Some("client") => AckMode::Client,
            Some("client-individual") => AckMode::ClientIndividual,
            _ => AckMode::Auto,
        }
    }
}

/// A message published to a destination.
///
/// Created when a `SEND` frame is accepted, queued on the destination's
/// inbound queue, and fanned out by the dispatcher. Per-subscription copies
/// may live on in the unacked table until acknowledged.
#[derive(Debug, Clone)]
pub struct Message {
    pub destination: String,
    /// MIME type from the `content-type` header; empty when the frame had
    /// no body.
    pub content_type: String,
    pub content: Vec<u8>,
    /// Client id of the publisher. The dispatcher never delivers a message
    /// back to its sender.
    pub sender: u64,
}

impl Message {
    pub fn new(
        destination: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
        sender: u64,
    ) -> Self {
        Self {
            destination: destination.into(),
            content_type: content_type.into(),
            content,
            sender,
        }
    }
}
