use std::fmt;

use crate::protocol::Command;

/// A single STOMP frame header.
///
/// Headers keep their wire order; when the same key appears more than once
/// the first occurrence wins for lookup but the raw sequence is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub key: String,
    pub value: String,
}

impl FrameHeader {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

/// A STOMP frame: a command, an ordered header sequence, and an opaque body.
///
/// `content_type` mirrors the `content-type` header; it is filled in by the
/// parser and by [`Frame::header`] so a built frame and its parsed round-trip
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<FrameHeader>,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: Vec::new(),
            content_type: None,
        }
    }

    /// Appends a header, builder style.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let header = FrameHeader::new(key, value);
        if header.key == "content-type" {
            self.content_type = Some(header.value.trim().to_string());
        }
        self.headers.push(header);
        self
    }

    /// Replaces the body, builder style.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the value of the first header with the given key.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key == key)
            .map(|h| h.value.as_str())
    }

    /// Serializes the frame to its wire form: command line, one `key:value`
    /// line per header, a blank separator line, the body verbatim, and a
    /// single NUL octet. A heart-beat is just a bare end-of-line.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.command == Command::HeartBeat {
            return b"\n".to_vec();
        }

        let mut buf = Vec::with_capacity(64 + self.body.len());
        buf.extend_from_slice(self.command.as_str().as_bytes());
        buf.push(b'\n');
        for header in &self.headers {
            buf.extend_from_slice(header.to_string().as_bytes());
            buf.push(b'\n');
        }
        buf.push(b'\n');
        buf.extend_from_slice(&self.body);
        buf.push(0);
        buf
    }
}
