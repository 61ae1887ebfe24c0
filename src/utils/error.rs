//! The `error` module defines the error types used within the `stompd`
//! application.
//!
//! Every failure the server can hit while talking to a client lives in
//! [`StompError`]: parse errors raised by the frame codec, semantic errors
//! raised by the frame handlers, and I/O errors from the socket. A single
//! enum keeps propagation uniform: any error reaching the session loop is
//! turned into an `ERROR` frame and the connection is closed.

use thiserror::Error;

use crate::protocol::codec::{MAX_BODY_LENGTH, MAX_HEADER_LENGTH, MAX_HEADER_LINES};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StompError>;

#[derive(Debug, Error)]
pub enum StompError {
    /// The command line did not match any STOMP command keyword.
    #[error("Unable to parse command {0}")]
    BadCommand(String),

    /// A header line was not in the form `<key>:<value>`, or a recognized
    /// header carried an unparseable value.
    #[error("Invalid header {0}. Expected a header in the form <header_key>:<header_value>")]
    MalformedHeader(String),

    #[error("Too many headers. The maximum number of allowed headers is {MAX_HEADER_LINES}")]
    TooManyHeaders,

    #[error("Header lines should not be longer than {MAX_HEADER_LENGTH} bytes")]
    HeaderTooLong,

    #[error("Content too large. The body should not be more than {MAX_BODY_LENGTH} bytes")]
    BodyTooLarge,

    /// `content-length` bytes were read but the following octet was not NUL.
    #[error(
        "The last octet in the body stream should be the null octet. \
         After reading the bytes declared by the content-length header, \
         the null octet was not present"
    )]
    UnterminatedBody,

    /// A header required by the frame's command is absent.
    #[error("Unable to process frame. The '{0}' header is required")]
    MissingHeader(&'static str),

    #[error("Invalid version number. Supported versions are 1.0, 1.1, 1.2")]
    BadVersion,

    #[error("Failed to parse 'heart-beat' header {0}")]
    BadHeartBeat(String),

    /// Recognized command with no server-side support (BEGIN/COMMIT/ABORT).
    #[error("Currently unable to handle {0} frames")]
    NotImplemented(crate::protocol::Command),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
