use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::protocol::{Command, Frame, FrameHeader};
use crate::utils::StompError;

/// A frame may not carry more than this many header lines.
pub const MAX_HEADER_LINES: usize = 20;
/// A single line (command or header) may not exceed this many bytes,
/// end-of-line excluded.
pub const MAX_HEADER_LENGTH: usize = 1024;
/// A frame body may not exceed this many bytes (1 MiB).
pub const MAX_BODY_LENGTH: usize = 1024 * 1024;

/// Incremental STOMP wire codec.
///
/// Decoding happens in three phases (command line, header block, body)
/// over whatever bytes have arrived so far. Incomplete input yields
/// `Ok(None)` and the caller feeds more bytes; size limits are enforced as
/// data accumulates, so a line or body that can no longer fit fails before
/// its terminator ever shows up.
///
/// The codec is stateless: a failed parse poisons the connection (the
/// session responds with an `ERROR` frame and closes), so there is nothing
/// to resynchronize.
#[derive(Debug, Default)]
pub struct StompCodec;

impl StompCodec {
    pub fn new() -> Self {
        StompCodec
    }
}

/// Locates the next `\n`-terminated line at `pos`, tolerating `\r\n`.
/// Returns the line without its end-of-line, and the offset just past it.
fn take_line(buf: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    let nl = buf[pos..].iter().position(|&b| b == b'\n')?;
    let mut line = &buf[pos..pos + nl];
    if line.last() == Some(&b'\r') {
        line = &line[..line.len() - 1];
    }
    Some((line, pos + nl + 1))
}

fn parse_header(line: &[u8]) -> Result<FrameHeader, StompError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| StompError::MalformedHeader(String::from_utf8_lossy(line).into_owned()))?;
    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Ok(FrameHeader::new(key, value)),
        _ => Err(StompError::MalformedHeader(text.to_string())),
    }
}

impl Decoder for StompCodec {
    type Item = Frame;
    type Error = StompError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, StompError> {
        if src.is_empty() {
            return Ok(None);
        }

        // Phase 1: command line. A bare end-of-line is a heart-beat and the
        // frame ends right there: no headers, no body, no NUL.
        let (command_line, mut pos) = match take_line(src, 0) {
            Some(found) => found,
            None => {
                if src.len() > MAX_HEADER_LENGTH {
                    return Err(StompError::HeaderTooLong);
                }
                return Ok(None);
            }
        };
        if command_line.is_empty() {
            src.advance(pos);
            return Ok(Some(Frame::new(Command::HeartBeat)));
        }
        let command = Command::parse(command_line)?;

        // Phase 2: header block, up to a blank line. Following the original
        // wire behaviour, a whitespace-only line also terminates the block.
        let mut headers: Vec<FrameHeader> = Vec::new();
        let mut content_length: Option<usize> = None;
        let mut content_type: Option<String> = None;
        loop {
            let (line, next) = match take_line(src, pos) {
                Some(found) => found,
                None => {
                    if src.len() - pos > MAX_HEADER_LENGTH {
                        return Err(StompError::HeaderTooLong);
                    }
                    return Ok(None);
                }
            };
            pos = next;

            if line.iter().all(u8::is_ascii_whitespace) {
                break;
            }
            if headers.len() == MAX_HEADER_LINES {
                return Err(StompError::TooManyHeaders);
            }
            if line.len() > MAX_HEADER_LENGTH {
                return Err(StompError::HeaderTooLong);
            }

            let header = parse_header(line)?;
            if header.key == "content-length" && content_length.is_none() {
                let parsed = header
                    .value
                    .parse::<usize>()
                    .map_err(|_| StompError::MalformedHeader(header.to_string()))?;
                content_length = Some(parsed);
            }
            if header.key == "content-type" && content_type.is_none() {
                content_type = Some(header.value.trim().to_string());
            }
            headers.push(header);
        }

        // Phase 3: body. With a content-length the declared byte count is
        // read exactly and the next octet must be NUL; without one the body
        // runs to the first NUL.
        let body: Vec<u8>;
        let consumed;
        match content_length {
            Some(len) => {
                if len > MAX_BODY_LENGTH {
                    return Err(StompError::BodyTooLarge);
                }
                if src.len() < pos + len + 1 {
                    return Ok(None);
                }
                if src[pos + len] != 0 {
                    return Err(StompError::UnterminatedBody);
                }
                body = src[pos..pos + len].to_vec();
                consumed = pos + len + 1;
            }
            None => {
                let nul = match src[pos..].iter().position(|&b| b == 0) {
                    Some(at) => at,
                    None => {
                        if src.len() - pos > MAX_BODY_LENGTH {
                            return Err(StompError::BodyTooLarge);
                        }
                        return Ok(None);
                    }
                };
                if nul > MAX_BODY_LENGTH {
                    return Err(StompError::BodyTooLarge);
                }
                body = src[pos..pos + nul].to_vec();
                consumed = pos + nul + 1;
            }
        }
        src.advance(consumed);

        Ok(Some(Frame {
            command,
            headers,
            body,
            content_type,
        }))
    }
}

impl Encoder<Frame> for StompCodec {
    type Error = StompError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), StompError> {
        dst.extend_from_slice(&frame.to_bytes());
        Ok(())
    }
}
