//! NDJSON codec for the JSON-RPC stdio transport.
//!
//! Wraps [`tokio_util::codec::LinesCodec`] with a maximum line length so an
//! unterminated or oversized request cannot exhaust memory.
//!
//! Framing problems that only affect one line (too long, not UTF-8) are
//! decoded as [`Frame::Malformed`] instead of an error. `FramedRead` stops
//! yielding after a decoder error, and a single bad line must never end the
//! session.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::{AppError, Result};

/// Maximum accepted request line: 16 MiB.
pub const MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// One decoded inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete UTF-8 line, without its terminator.
    Line(String),
    /// A line that could not be framed; carries the reason.
    Malformed(String),
}

/// Line codec for JSON-RPC traffic.
#[derive(Debug)]
pub struct RpcCodec {
    lines: LinesCodec,
    max_length: usize,
}

impl RpcCodec {
    /// Create a codec with the default [`MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_BYTES)
    }

    /// Create a codec with a custom line limit.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }
}

impl Default for RpcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RpcCodec {
    type Item = Frame;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let decoded = self.lines.decode(src);
        map_decoded(decoded, self.max_length)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let decoded = self.lines.decode_eof(src);
        map_decoded(decoded, self.max_length)
    }
}

impl Encoder<String> for RpcCodec {
    type Error = AppError;

    /// Encode `item` as a `\n`-terminated line.
    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        self.lines
            .encode(item, dst)
            .map_err(|err| AppError::Io(err.to_string()))
    }
}

fn map_decoded(
    decoded: std::result::Result<Option<String>, LinesCodecError>,
    max_length: usize,
) -> Result<Option<Frame>> {
    match decoded {
        Ok(line) => Ok(line.map(Frame::Line)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Malformed(format!(
            "line exceeds {max_length} bytes"
        )))),
        Err(LinesCodecError::Io(err)) if err.kind() == std::io::ErrorKind::InvalidData => {
            Ok(Some(Frame::Malformed("line is not valid UTF-8".into())))
        }
        Err(LinesCodecError::Io(err)) => Err(AppError::Io(err.to_string())),
    }
}
