use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, timeout, Instant};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::broker::Broker;
use crate::config::HeartbeatSettings;
use crate::handlers;
use crate::protocol::{Command, Frame, StompCodec};

/// Slack added on top of the negotiated incoming heart-beat period before the
/// connection is declared dead.
const INACTIVITY_GRACE: Duration = Duration::from_secs(10);

/// A connected client as the broker sees it: its id, its address for display,
/// and the channel that reaches its socket writer. Dropping the record closes
/// the channel, which is how the broker shuts a connection down.
#[derive(Debug)]
pub struct Client {
    pub id: u64,
    pub remote_addr: String,
    pub sender: mpsc::UnboundedSender<Frame>,
}

impl Client {
    pub fn new(id: u64, remote_addr: impl Into<String>, sender: mpsc::UnboundedSender<Frame>) -> Self {
        Self {
            id,
            remote_addr: remote_addr.into(),
            sender,
        }
    }
}

/// Per-connection lifecycle. A session is `Accepted` until the client's
/// first frame; only `CONNECT`/`STOMP` move it to `Connected`. Every exit
/// path (`DISCONNECT`, inactivity, parse error, handler error, socket error)
/// traverses `Closing` to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Accepted,
    Connected,
    Closing,
    Closed,
}

/// The state a connection carries between frames: negotiated protocol
/// version and the heart-beat pairs both sides declared.
///
/// `client_heartbeat` is `(cx, cy)` from the client's `heart-beat` header;
/// `server_heartbeat` is `(sx, sy)` from the server configuration. Effective
/// periods follow STOMP: the server sends every `max(sx, cy)` iff both are
/// non-zero, and expects to hear from the client every `max(cx, sy)` iff
/// both are non-zero.
#[derive(Debug)]
pub struct Session {
    pub id: u64,
    pub remote_addr: String,
    pub version: f64,
    pub client_heartbeat: (u64, u64),
    pub server_heartbeat: (u64, u64),
    pub state: SessionState,
}

impl Session {
    pub fn new(id: u64, remote_addr: impl Into<String>, server_heartbeat: (u64, u64)) -> Self {
        Self {
            id,
            remote_addr: remote_addr.into(),
            version: 1.0,
            client_heartbeat: (0, 0),
            server_heartbeat,
            state: SessionState::Accepted,
        }
    }

    pub fn can_send_heartbeat(&self) -> bool {
        self.server_heartbeat.0 > 0 && self.client_heartbeat.1 > 0
    }

    pub fn can_receive_heartbeat(&self) -> bool {
        self.client_heartbeat.0 > 0 && self.server_heartbeat.1 > 0
    }

    /// How often the writer emits heart-beats, when the negotiation enabled
    /// the server-to-client direction.
    pub fn heartbeat_send_period(&self) -> Option<Duration> {
        self.can_send_heartbeat()
            .then(|| Duration::from_millis(self.server_heartbeat.0.max(self.client_heartbeat.1)))
    }

    /// The inactivity watchdog: how long the read loop waits for any inbound
    /// byte before tearing the connection down.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.can_receive_heartbeat().then(|| {
            Duration::from_millis(self.client_heartbeat.0.max(self.server_heartbeat.1))
                + INACTIVITY_GRACE
        })
    }
}

/// Drives one accepted connection: registers the client, spawns its socket
/// writer, then reads frames one at a time (parse, dispatch, write the
/// response, loop). No pipelining: a frame is fully handled before the next
/// one is read.
pub async fn run(stream: TcpStream, broker: Arc<Broker>, heartbeat: HeartbeatSettings) {
    let remote_addr = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let (sink, frames) = Framed::new(stream, StompCodec::new()).split();

    let (tx, rx) = mpsc::unbounded_channel::<Frame>();
    let (hb_tx, hb_rx) = watch::channel(None);

    let id = broker.allocate_client_id();
    broker.register_client(Client::new(id, remote_addr.clone(), tx.clone()));
    debug!(client = id, addr = %remote_addr, "session started");

    tokio::spawn(write_loop(sink, rx, hb_rx, Arc::clone(&broker), id));

    let mut session = Session::new(
        id,
        remote_addr,
        (heartbeat.outgoing_ms, heartbeat.incoming_ms),
    );
    read_loop(&mut session, &broker, frames, &tx, &hb_tx).await;

    session.state = SessionState::Closed;
    broker.remove_client(id);
    debug!(client = id, "session ended");
}

async fn read_loop(
    session: &mut Session,
    broker: &Arc<Broker>,
    mut frames: SplitStream<Framed<TcpStream, StompCodec>>,
    tx: &mpsc::UnboundedSender<Frame>,
    hb_tx: &watch::Sender<Option<Duration>>,
) {
    loop {
        let next = match session.read_timeout() {
            Some(limit) => match timeout(limit, frames.next()).await {
                Ok(item) => item,
                // Heart-beat timeout closes silently, no ERROR frame.
                Err(_) => {
                    debug!(client = session.id, "inactivity timeout");
                    return;
                }
            },
            None => frames.next().await,
        };

        let frame = match next {
            // Peer closed the socket.
            None => return,
            Some(Err(err)) => {
                warn!(client = session.id, %err, "unreadable frame");
                let _ = tx.send(handlers::error_frame(&err.to_string(), None));
                return;
            }
            Some(Ok(frame)) => frame,
        };

        // A bare end-of-line only proves liveness. Reaching this point
        // already rearmed the watchdog.
        if frame.command == Command::HeartBeat {
            continue;
        }

        if session.state == SessionState::Accepted
            && !matches!(frame.command, Command::Connect | Command::Stomp)
        {
            let message = format!("Expected a CONNECT or STOMP frame, got {}", frame.command);
            let _ = tx.send(handlers::error_frame(&message, Some(&frame)));
            return;
        }

        match handlers::handle_frame(session, broker, &frame).await {
            Ok(Some(response)) => {
                if tx.send(response).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(client = session.id, %err, "frame rejected");
                let _ = tx.send(handlers::error_frame(&err.to_string(), Some(&frame)));
                return;
            }
        }

        match frame.command {
            // Negotiation just finished; arm the outbound heart-beat timer.
            Command::Connect | Command::Stomp => {
                let _ = hb_tx.send(session.heartbeat_send_period());
            }
            Command::Disconnect => return,
            _ => {}
        }
    }
}

/// Owns the write half of the socket. Outbound frames arrive on the client's
/// channel; once negotiation enables them, heart-beats are interleaved on
/// their own interval. Any write error counts as a dead client.
async fn write_loop(
    mut sink: SplitSink<Framed<TcpStream, StompCodec>, Frame>,
    mut rx: mpsc::UnboundedReceiver<Frame>,
    mut heartbeat: watch::Receiver<Option<Duration>>,
    broker: Arc<Broker>,
    client_id: u64,
) {
    let mut ticker = None;
    let mut negotiating = true;
    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(frame) => {
                    if sink.send(frame).await.is_err() {
                        broker.remove_client(client_id);
                        return;
                    }
                }
                // Channel closed: the broker dropped this client.
                None => {
                    let _ = sink.close().await;
                    return;
                }
            },
            changed = heartbeat.changed(), if negotiating => match changed {
                Ok(()) => {
                    ticker = (*heartbeat.borrow_and_update())
                        .map(|period| interval_at(Instant::now() + period, period));
                }
                Err(_) => negotiating = false,
            },
            _ = next_tick(&mut ticker) => {
                if sink.send(Frame::new(Command::HeartBeat)).await.is_err() {
                    broker.remove_client(client_id);
                    return;
                }
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
