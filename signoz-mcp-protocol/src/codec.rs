//! Newline-delimited JSON framing for the stdio transport

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder};

/// Maximum frame size (16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Frame codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

/// A decoded input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Line text without its terminator
    Line(String),
    /// A line longer than the frame limit; its bytes were discarded
    TooLarge { size: usize, max: usize },
}

/// One JSON document per line
///
/// Decoding yields raw lines (without the terminator) so the caller can
/// report malformed JSON as a JSON-RPC parse error instead of tearing
/// down the stream. Blank lines are skipped and a trailing `\r` is
/// dropped. An oversized line is dropped up to its terminator and
/// reported as [`Frame::TooLarge`], after which decoding carries on with
/// the next line. Encoding writes compact JSON followed by `\n`.
#[derive(Debug, Clone)]
pub struct JsonLineCodec {
    max_frame: usize,
    /// Bytes of an oversized line dropped so far
    discarding: Option<usize>,
}

impl JsonLineCodec {
    pub fn new() -> Self {
        Self::with_max_frame(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            max_frame,
            discarding: None,
        }
    }

    fn too_large(&self, size: usize) -> CodecError {
        CodecError::FrameTooLarge {
            size,
            max: self.max_frame,
        }
    }

    fn oversized(&self, size: usize) -> Frame {
        Frame::TooLarge {
            size,
            max: self.max_frame,
        }
    }
}

impl Default for JsonLineCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_text(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

impl Decoder for JsonLineCodec {
    type Item = Frame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let newline = src.iter().position(|b| *b == b'\n');

            if let Some(dropped) = self.discarding {
                return match newline {
                    Some(pos) => {
                        src.advance(pos + 1);
                        self.discarding = None;
                        Ok(Some(self.oversized(dropped + pos)))
                    }
                    None => {
                        self.discarding = Some(dropped + src.len());
                        src.clear();
                        Ok(None)
                    }
                };
            }

            let Some(pos) = newline else {
                if src.len() > self.max_frame {
                    self.discarding = Some(src.len());
                    src.clear();
                }
                return Ok(None);
            };

            if pos > self.max_frame {
                src.advance(pos + 1);
                return Ok(Some(self.oversized(pos)));
            }

            let line = src.split_to(pos + 1);
            let text = frame_text(&line[..pos]);
            if !text.trim().is_empty() {
                return Ok(Some(Frame::Line(text)));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if let Some(dropped) = self.discarding.take() {
            return Ok(Some(self.oversized(dropped)));
        }
        if src.is_empty() {
            return Ok(None);
        }

        // Final line without a terminator
        let rest = src.split_to(src.len());
        let text = frame_text(&rest);
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(Frame::Line(text)))
        }
    }
}

impl<T: Serialize> Encoder<T> for JsonLineCodec {
    type Error = CodecError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let data = serde_json::to_vec(&item)?;

        if data.len() > self.max_frame {
            return Err(self.too_large(data.len()));
        }

        dst.reserve(data.len() + 1);
        dst.put_slice(&data);
        dst.put_u8(b'\n');
        Ok(())
    }
}
