use std::fmt::Write as _;

use bytes::{BufMut, BytesMut};

use crate::codec::Codec;
use crate::command::{Access, Command};
use crate::error::{FrameError, Result};
use crate::payload::Payload;

/// Line terminator for text requests.
pub const LINE_END: &[u8] = b"\r\n";

/// Upper bound on a single text reply line.
pub const MAX_LINE: usize = 256;

/// Space-delimited ASCII variant of the protocol.
///
/// Requests are `"<topic>[ v1 v2 v3]\r\n"`; only write commands carry values.
/// Replies are a single newline-terminated line with exactly `n` decimal
/// floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn encode(&self, command: &Command, payload: &Payload, dst: &mut BytesMut) {
        let mut line = String::from(command.topic);
        if command.access == Access::Write {
            match *payload {
                Payload::Empty => {}
                Payload::Indexed { value, .. } => {
                    let _ = write!(line, " {value}");
                }
                Payload::Vector(values) => {
                    for value in values {
                        let _ = write!(line, " {value}");
                    }
                }
            }
        }
        dst.reserve(line.len() + LINE_END.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(LINE_END);
    }

    fn frame_overhead(&self) -> usize {
        LINE_END.len()
    }

    fn reply_is_framed(&self) -> bool {
        true
    }

    fn decode_reply(&self, src: &[u8], count: usize) -> Result<Vec<f32>> {
        let line = std::str::from_utf8(src)
            .map_err(|_| FrameError::MalformedReply("reply is not valid UTF-8".to_string()))?;
        let values = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f32>().map_err(|_| {
                    FrameError::MalformedReply(format!("invalid number '{token}'"))
                })
            })
            .collect::<Result<Vec<f32>>>()?;
        if values.len() != count {
            return Err(FrameError::MalformedReply(format!(
                "expected {count} values, got {}",
                values.len()
            )));
        }
        Ok(values)
    }
}
