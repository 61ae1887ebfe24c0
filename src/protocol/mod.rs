//! The `protocol` module implements the STOMP wire layer.
//!
//! It contains the following main components:
//!
//! - `Command`: the closed set of frame commands, plus the synthetic
//!   heart-beat pseudo-command.
//! - `Frame` / `FrameHeader`: a parsed frame and its ordered headers.
//! - `StompCodec`: the incremental parser/serializer that turns a TCP byte
//!   stream into frames and back.
//!
//! Everything above this module works with [`Frame`] values; only the codec
//! touches raw bytes.

pub mod codec;
pub mod command;
pub mod frame;

pub use codec::StompCodec;
pub use command::Command;
pub use frame::{Frame, FrameHeader};
