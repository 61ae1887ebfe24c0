use std::fmt;

use crate::utils::StompError;

/// A STOMP frame command.
///
/// The set is closed: anything that does not match one of the keywords below
/// fails to parse. `HeartBeat` is synthetic. The STOMP specification lets a
/// client with nothing to say send a bare end-of-line instead of a full
/// frame, and the parser maps that onto this variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Begin,
    Commit,
    Abort,
    Ack,
    Nack,
    Disconnect,
    Message,
    Receipt,
    Error,
    HeartBeat,
}

impl Command {
    /// Parses a command line as it appears on the wire. Matching is exact and
    /// case sensitive; `\n` and `\r\n` map to [`Command::HeartBeat`].
    pub fn parse(raw: &[u8]) -> Result<Command, StompError> {
        let cmd = match raw {
            b"\r\n" | b"\n" => Command::HeartBeat,
            b"CONNECT" => Command::Connect,
            b"STOMP" => Command::Stomp,
            b"CONNECTED" => Command::Connected,
            b"SEND" => Command::Send,
            b"SUBSCRIBE" => Command::Subscribe,
            b"UNSUBSCRIBE" => Command::Unsubscribe,
            b"BEGIN" => Command::Begin,
            b"COMMIT" => Command::Commit,
            b"ABORT" => Command::Abort,
            b"ACK" => Command::Ack,
            b"NACK" => Command::Nack,
            b"DISCONNECT" => Command::Disconnect,
            b"MESSAGE" => Command::Message,
            b"RECEIPT" => Command::Receipt,
            b"ERROR" => Command::Error,
            other => {
                return Err(StompError::BadCommand(
                    String::from_utf8_lossy(other).into_owned(),
                ))
            }
        };
        Ok(cmd)
    }

    /// The server command that answers a client command: `CONNECT`/`STOMP`
    /// get `CONNECTED`, everything else defaults to `ERROR`. Handlers that
    /// emit `MESSAGE` or `RECEIPT` override this.
    pub fn response(self) -> Command {
        match self {
            Command::Connect | Command::Stomp => Command::Connected,
            _ => Command::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Disconnect => "DISCONNECT",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
            // Not a wire keyword; serialization special-cases heart-beats.
            Command::HeartBeat => "HeartBeat",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
