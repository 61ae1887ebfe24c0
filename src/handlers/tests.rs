use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::{error_frame, handle_frame};
use crate::broker::Broker;
use crate::client::{Client, Session, SessionState};
use crate::protocol::{Command, Frame};
use crate::utils::StompError;

fn broker_with_client(session_id: u64) -> (Arc<Broker>, mpsc::UnboundedReceiver<Frame>) {
    let broker = Arc::new(Broker::new());
    let (tx, rx) = mpsc::unbounded_channel();
    broker.register_client(Client::new(session_id, "test-peer", tx));
    (broker, rx)
}

fn connected_session(id: u64) -> Session {
    let mut session = Session::new(id, "test-peer", (30000, 60000));
    session.state = SessionState::Connected;
    session
}

#[tokio::test]
async fn test_connect_negotiates_highest_version() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = Session::new(1, "test-peer", (30000, 60000));

    let frame = Frame::new(Command::Connect).header("accept-version", "1.0,1.1,1.2");
    let response = handle_frame(&mut session, &broker, &frame)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.command, Command::Connected);
    assert_eq!(response.header_value("version"), Some("1.2"));
    assert_eq!(session.version, 1.2);
    assert_eq!(session.state, SessionState::Connected);
}

#[tokio::test]
async fn test_connect_without_accept_version_defaults_to_1_0() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = Session::new(1, "test-peer", (0, 0));

    let response = handle_frame(&mut session, &broker, &Frame::new(Command::Stomp))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.header_value("version"), Some("1.0"));
}

#[tokio::test]
async fn test_connect_rejects_out_of_range_versions() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = Session::new(1, "test-peer", (0, 0));

    let frame = Frame::new(Command::Connect).header("accept-version", "1.3");
    assert!(matches!(
        handle_frame(&mut session, &broker, &frame).await,
        Err(StompError::BadVersion)
    ));

    let frame = Frame::new(Command::Connect).header("accept-version", "2.0");
    assert!(matches!(
        handle_frame(&mut session, &broker, &frame).await,
        Err(StompError::BadVersion)
    ));
}

#[tokio::test]
async fn test_connect_echoes_server_heartbeat_pair() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = Session::new(1, "test-peer", (30000, 60000));

    let frame = Frame::new(Command::Connect)
        .header("accept-version", "1.2")
        .header("heart-beat", "0,0");
    let response = handle_frame(&mut session, &broker, &frame)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.header_value("heart-beat"), Some("30000,60000"));
    assert_eq!(session.client_heartbeat, (0, 0));
}

#[tokio::test]
async fn test_connect_stores_client_heartbeat_declaration() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = Session::new(1, "test-peer", (30000, 60000));

    let frame = Frame::new(Command::Connect).header("heart-beat", "20000,45000");
    handle_frame(&mut session, &broker, &frame).await.unwrap();
    assert_eq!(session.client_heartbeat, (20000, 45000));
}

#[tokio::test]
async fn test_connect_without_heartbeat_header_omits_it_in_response() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = Session::new(1, "test-peer", (30000, 60000));

    let response = handle_frame(&mut session, &broker, &Frame::new(Command::Connect))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.header_value("heart-beat"), None);
}

#[tokio::test]
async fn test_connect_rejects_malformed_heartbeat() {
    let (broker, _rx) = broker_with_client(1);

    for bad in ["abc,5", "5", "5,6,7", "-1,0"] {
        let mut session = Session::new(1, "test-peer", (0, 0));
        let frame = Frame::new(Command::Connect).header("heart-beat", bad);
        assert!(
            matches!(
                handle_frame(&mut session, &broker, &frame).await,
                Err(StompError::BadHeartBeat(_))
            ),
            "expected BadHeartBeat for {:?}",
            bad
        );
    }
}

#[tokio::test]
async fn test_subscribe_requires_destination_and_numeric_id() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    let frame = Frame::new(Command::Subscribe).header("id", "3");
    assert!(matches!(
        handle_frame(&mut session, &broker, &frame).await,
        Err(StompError::MissingHeader("destination"))
    ));

    let frame = Frame::new(Command::Subscribe).header("destination", "/queue/a");
    assert!(matches!(
        handle_frame(&mut session, &broker, &frame).await,
        Err(StompError::MissingHeader("id"))
    ));

    let frame = Frame::new(Command::Subscribe)
        .header("destination", "/queue/a")
        .header("id", "abc");
    assert!(matches!(
        handle_frame(&mut session, &broker, &frame).await,
        Err(StompError::MalformedHeader(_))
    ));
}

#[tokio::test]
async fn test_subscribe_registers_and_emits_receipt() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    let frame = Frame::new(Command::Subscribe)
        .header("destination", "/queue/y")
        .header("id", "3")
        .header("receipt", "r-9");
    let response = handle_frame(&mut session, &broker, &frame)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.command, Command::Receipt);
    assert_eq!(response.header_value("receipt-id"), Some("r-9"));
    assert_eq!(broker.subscriber_count("/queue/y"), 1);
}

#[tokio::test]
async fn test_subscribe_without_receipt_stays_silent() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    let frame = Frame::new(Command::Subscribe)
        .header("destination", "/queue/y")
        .header("id", "3");
    assert!(handle_frame(&mut session, &broker, &frame)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_unsubscribe_removes_subscription() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    let subscribe = Frame::new(Command::Subscribe)
        .header("destination", "/queue/y")
        .header("id", "3");
    handle_frame(&mut session, &broker, &subscribe)
        .await
        .unwrap();

    let unsubscribe = Frame::new(Command::Unsubscribe).header("id", "3");
    handle_frame(&mut session, &broker, &unsubscribe)
        .await
        .unwrap();
    assert_eq!(broker.subscriber_count("/queue/y"), 0);
}

#[tokio::test]
async fn test_send_to_unsubscribed_destination_is_a_noop() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    let frame = Frame::new(Command::Send)
        .header("destination", "/queue/x")
        .header("content-type", "text/plain")
        .body(*b"hi");
    assert!(handle_frame(&mut session, &broker, &frame)
        .await
        .unwrap()
        .is_none());
    assert!(!broker.has_destination("/queue/x"));
}

#[tokio::test]
async fn test_send_requires_content_type_for_nonempty_body() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    let frame = Frame::new(Command::Send)
        .header("destination", "/queue/x")
        .body(*b"hi");
    assert!(matches!(
        handle_frame(&mut session, &broker, &frame).await,
        Err(StompError::MissingHeader("content-type"))
    ));

    // An empty body needs no content-type.
    let frame = Frame::new(Command::Send).header("destination", "/queue/x");
    assert!(handle_frame(&mut session, &broker, &frame).await.is_ok());
}

#[tokio::test]
async fn test_send_reaches_a_subscriber() {
    let (broker, _pub_rx) = broker_with_client(1);
    let mut publisher = connected_session(1);

    let (sub_tx, mut sub_rx) = mpsc::unbounded_channel();
    broker.register_client(Client::new(2, "subscriber", sub_tx));
    let mut subscriber = connected_session(2);
    let subscribe = Frame::new(Command::Subscribe)
        .header("destination", "/queue/x")
        .header("id", "7");
    handle_frame(&mut subscriber, &broker, &subscribe)
        .await
        .unwrap();

    let send = Frame::new(Command::Send)
        .header("destination", "/queue/x")
        .header("content-type", "text/plain")
        .header("content-length", "2")
        .body(*b"hi");
    handle_frame(&mut publisher, &broker, &send).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let delivery = sub_rx.try_recv().unwrap();
    assert_eq!(delivery.command, Command::Message);
    assert_eq!(delivery.header_value("subscription"), Some("7"));
    assert_eq!(delivery.header_value("destination"), Some("/queue/x"));
    assert_eq!(delivery.body, b"hi");
}

#[tokio::test]
async fn test_ack_requires_id() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    assert!(matches!(
        handle_frame(&mut session, &broker, &Frame::new(Command::Ack)).await,
        Err(StompError::MissingHeader("id"))
    ));
    assert!(matches!(
        handle_frame(&mut session, &broker, &Frame::new(Command::Nack)).await,
        Err(StompError::MissingHeader("id"))
    ));
}

#[tokio::test]
async fn test_disconnect_moves_to_closing_and_receipts() {
    let (broker, _rx) = broker_with_client(1);
    let mut session = connected_session(1);

    let frame = Frame::new(Command::Disconnect).header("receipt", "bye-1");
    let response = handle_frame(&mut session, &broker, &frame)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.command, Command::Receipt);
    assert_eq!(response.header_value("receipt-id"), Some("bye-1"));
    assert_eq!(session.state, SessionState::Closing);
}

#[tokio::test]
async fn test_transaction_commands_are_not_implemented() {
    let (broker, _rx) = broker_with_client(1);

    for command in [Command::Begin, Command::Commit, Command::Abort] {
        let mut session = connected_session(1);
        assert!(matches!(
            handle_frame(&mut session, &broker, &Frame::new(command)).await,
            Err(StompError::NotImplemented(_))
        ));
    }
}

#[test]
fn test_error_frame_dumps_the_offending_frame() {
    let offending = Frame::new(Command::Connect)
        .header("accept-version", "2.0")
        .header("receipt", "r-1");
    let frame = error_frame("Invalid version number", Some(&offending));

    assert_eq!(frame.command, Command::Error);
    assert_eq!(
        frame.header_value("message"),
        Some("Invalid version number")
    );
    assert_eq!(frame.header_value("receipt-id"), Some("r-1"));

    let body = String::from_utf8(frame.body.clone()).unwrap();
    assert!(body.starts_with("----------------\n"));
    assert!(body.ends_with("----------------\n"));
    assert!(body.contains("CONNECT\naccept-version:2.0\n"));
    // The offender's trailing NUL does not appear in the dump.
    assert!(!frame.body.contains(&0));
}

#[test]
fn test_error_frame_without_offender_has_no_body() {
    let frame = error_frame("io error: broken pipe", None);
    assert!(frame.body.is_empty());
    assert_eq!(frame.header_value("receipt-id"), None);
}
