use std::sync::Arc;

use crate::broker::{AckMode, Broker, Message};
use crate::client::{Session, SessionState};
use crate::handlers::receipt_for;
use crate::protocol::Frame;
use crate::utils::{Result, StompError};

pub fn handle_subscribe(
    session: &Session,
    broker: &Arc<Broker>,
    frame: &Frame,
) -> Result<Option<Frame>> {
    let destination = frame
        .header_value("destination")
        .ok_or(StompError::MissingHeader("destination"))?;
    let id = subscription_id(frame)?;
    let ack = AckMode::from_header(frame.header_value("ack"));

    Arc::clone(broker).add_subscription(destination, id, session.id, ack);
    Ok(receipt_for(frame))
}

pub fn handle_unsubscribe(
    session: &Session,
    broker: &Arc<Broker>,
    frame: &Frame,
) -> Result<Option<Frame>> {
    let id = subscription_id(frame)?;
    broker.remove_subscription(session.id, id);
    Ok(receipt_for(frame))
}

/// Handles `SEND`: builds a message from the frame and enqueues it on the
/// destination's inbound queue. Publishing to a destination with no
/// subscribers is a silent no-op. A non-empty body requires `content-type`;
/// `content-length` stays optional (the STOMP specification says SHOULD).
pub async fn handle_send(
    session: &Session,
    broker: &Arc<Broker>,
    frame: &Frame,
) -> Result<Option<Frame>> {
    let destination = frame
        .header_value("destination")
        .ok_or(StompError::MissingHeader("destination"))?;

    let content_type = if frame.body.is_empty() {
        String::new()
    } else {
        frame
            .content_type
            .clone()
            .ok_or(StompError::MissingHeader("content-type"))?
    };

    let message = Message::new(destination, content_type, frame.body.clone(), session.id);
    broker.publish(message).await;
    Ok(receipt_for(frame))
}

/// Handles `ACK` and `NACK`. Both remove the named message from the unacked
/// table; this broker does not redeliver, so the two are bookkeeping twins.
pub fn handle_ack(
    session: &Session,
    broker: &Arc<Broker>,
    frame: &Frame,
) -> Result<Option<Frame>> {
    let message_id = frame
        .header_value("id")
        .ok_or(StompError::MissingHeader("id"))?;
    broker.acknowledge(session.id, message_id);
    Ok(receipt_for(frame))
}

pub fn handle_disconnect(session: &mut Session, frame: &Frame) -> Result<Option<Frame>> {
    session.state = SessionState::Closing;
    Ok(receipt_for(frame))
}

/// The `id` header of SUBSCRIBE/UNSUBSCRIBE, which must be numeric.
fn subscription_id(frame: &Frame) -> Result<u64> {
    let raw = frame
        .header_value("id")
        .ok_or(StompError::MissingHeader("id"))?;
    raw.parse()
        .map_err(|_| StompError::MalformedHeader(format!("id:{}", raw)))
}
