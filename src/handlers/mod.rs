//! The `handlers` module maps inbound frames onto broker operations.
//!
//! One handler per command: each receives the session and the parsed frame
//! and returns an optional response frame for this connection, possibly with
//! side effects on the broker. Errors propagate to the session loop, which
//! answers with an `ERROR` frame and closes the connection.

pub mod connect;
pub mod messaging;

use std::sync::Arc;

use crate::broker::Broker;
use crate::client::Session;
use crate::protocol::{Command, Frame};
use crate::utils::{Result, StompError};

/// Dispatches a frame to its command handler. `BEGIN`/`COMMIT`/`ABORT` are
/// recognized on the wire but not supported: they surface as an error frame
/// and the connection is torn down.
pub async fn handle_frame(
    session: &mut Session,
    broker: &Arc<Broker>,
    frame: &Frame,
) -> Result<Option<Frame>> {
    match frame.command {
        Command::Connect | Command::Stomp => connect::handle_connect(session, frame),
        Command::Subscribe => messaging::handle_subscribe(session, broker, frame),
        Command::Unsubscribe => messaging::handle_unsubscribe(session, broker, frame),
        Command::Send => messaging::handle_send(session, broker, frame).await,
        Command::Ack | Command::Nack => messaging::handle_ack(session, broker, frame),
        Command::Disconnect => messaging::handle_disconnect(session, frame),
        other => Err(StompError::NotImplemented(other)),
    }
}

/// Builds the `RECEIPT` response when the client's frame asked for one.
pub(crate) fn receipt_for(frame: &Frame) -> Option<Frame> {
    frame
        .header_value("receipt")
        .map(|receipt_id| Frame::new(Command::Receipt).header("receipt-id", receipt_id))
}

const DUMP_RULE: &[u8] = b"----------------\n";

/// Builds the `ERROR` frame sent before a connection is closed: the reason
/// in the `message` header, the offender's `receipt-id` when it asked for a
/// receipt, and, when the offending frame is available, its dump (minus the
/// trailing NUL) between two dashed separator lines.
pub fn error_frame(message: &str, offending: Option<&Frame>) -> Frame {
    let mut frame = Frame::new(Command::Error).header("message", message);
    if let Some(offender) = offending {
        if let Some(receipt_id) = offender.header_value("receipt") {
            frame = frame.header("receipt-id", receipt_id);
        }
        let mut dump = offender.to_bytes();
        dump.pop();
        let mut body = Vec::with_capacity(dump.len() + 2 * DUMP_RULE.len() + 1);
        body.extend_from_slice(DUMP_RULE);
        body.extend_from_slice(&dump);
        body.push(b'\n');
        body.extend_from_slice(DUMP_RULE);
        frame = frame.body(body);
    }
    frame
}

#[cfg(test)]
mod tests;
