use tokio::sync::mpsc;

use super::{Client, Session, SessionState};
use crate::protocol::Frame;

#[test]
fn test_client_new() {
    let (tx, _rx) = mpsc::unbounded_channel::<Frame>();
    let client = Client::new(7, "127.0.0.1:50000", tx);
    assert_eq!(client.id, 7);
    assert_eq!(client.remote_addr, "127.0.0.1:50000");
}

#[test]
fn test_session_starts_accepted_with_defaults() {
    let session = Session::new(1, "peer", (30000, 60000));
    assert_eq!(session.state, SessionState::Accepted);
    assert_eq!(session.version, 1.0);
    assert_eq!(session.client_heartbeat, (0, 0));
}

#[test]
fn test_heartbeat_predicates_require_both_sides() {
    let mut session = Session::new(1, "peer", (30000, 60000));
    // Client declared nothing: both directions stay off.
    assert!(!session.can_send_heartbeat());
    assert!(!session.can_receive_heartbeat());

    session.client_heartbeat = (20000, 10000);
    assert!(session.can_send_heartbeat());
    assert!(session.can_receive_heartbeat());

    // A zero on either side disables that direction.
    session.server_heartbeat = (0, 60000);
    assert!(!session.can_send_heartbeat());
    assert!(session.can_receive_heartbeat());
}

#[test]
fn test_heartbeat_periods_take_the_maximum() {
    let mut session = Session::new(1, "peer", (30000, 60000));
    session.client_heartbeat = (20000, 45000);

    // Outgoing: max(sx=30000, cy=45000).
    assert_eq!(
        session.heartbeat_send_period(),
        Some(std::time::Duration::from_millis(45000))
    );
    // Incoming watchdog: max(cx=20000, sy=60000) plus the grace period.
    assert_eq!(
        session.read_timeout(),
        Some(std::time::Duration::from_millis(60000) + std::time::Duration::from_secs(10))
    );
}

#[test]
fn test_disabled_heartbeats_leave_no_timers() {
    let session = Session::new(1, "peer", (0, 0));
    assert_eq!(session.heartbeat_send_period(), None);
    assert_eq!(session.read_timeout(), None);
}
