use crate::client::{Session, SessionState};
use crate::protocol::Frame;
use crate::utils::{Result, StompError};

/// Handles `CONNECT` and `STOMP` frames.
///
/// Version negotiation follows the STOMP specification: of the versions the
/// client lists in `accept-version`, the highest supported one wins. The
/// optional `heart-beat` header is the client's `cx,cy` declaration; the
/// `CONNECTED` reply advertises the server's own pair in return.
pub fn handle_connect(session: &mut Session, frame: &Frame) -> Result<Option<Frame>> {
    let version = negotiate_version(frame)?;
    session.version = version;

    let mut response =
        Frame::new(frame.command.response()).header("version", format!("{:.1}", version));

    if let Some(raw) = frame.header_value("heart-beat") {
        session.client_heartbeat = parse_heartbeat(raw)?;
        let (sx, sy) = session.server_heartbeat;
        response = response.header("heart-beat", format!("{},{}", sx, sy));
    }

    session.state = SessionState::Connected;
    Ok(Some(response))
}

/// Picks the highest version from the client's comma-separated
/// `accept-version` list. Every entry must parse as a decimal inside
/// [1.0, 1.2]; an absent (or empty) header defaults to 1.0.
fn negotiate_version(frame: &Frame) -> Result<f64> {
    let mut highest: f64 = 1.0;
    if let Some(list) = frame.header_value("accept-version") {
        if !list.trim().is_empty() {
            for token in list.split(',') {
                let version: f64 = token.trim().parse().map_err(|_| StompError::BadVersion)?;
                if !(1.0..=1.2).contains(&version) {
                    return Err(StompError::BadVersion);
                }
                if version > highest {
                    highest = version;
                }
            }
        }
    }
    Ok(highest)
}

/// Parses the `heart-beat` header: two non-negative integer millisecond
/// values separated by a comma.
fn parse_heartbeat(raw: &str) -> Result<(u64, u64)> {
    let mut parts = raw.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(cx), Some(cy), None) => {
            let cx = cx
                .trim()
                .parse()
                .map_err(|_| StompError::BadHeartBeat(raw.to_string()))?;
            let cy = cy
                .trim()
                .parse()
                .map_err(|_| StompError::BadHeartBeat(raw.to_string()))?;
            Ok((cx, cy))
        }
        _ => Err(StompError::BadHeartBeat(raw.to_string())),
    }
}
