use bytes::{BufMut, BytesMut};

use crate::command::RequestShape;
use crate::error::{FrameError, Result};

/// Size of one IEEE-754 single-precision value on the wire.
pub const FLOAT_SIZE: usize = 4;

/// Request payload carried after the frame header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    /// No payload.
    Empty,
    /// Position selector followed by one value (`<Bf`).
    Indexed { position: u8, value: f32 },
    /// Three values (`<fff`).
    Vector([f32; 3]),
}

impl Payload {
    /// Shape this payload satisfies.
    pub fn shape(&self) -> RequestShape {
        match self {
            Payload::Empty => RequestShape::Empty,
            Payload::Indexed { .. } => RequestShape::Indexed,
            Payload::Vector(_) => RequestShape::Vector,
        }
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.shape().payload_len()
    }

    /// True for [`Payload::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Append the little-endian encoding to `dst`.
    pub fn put(&self, dst: &mut BytesMut) {
        match *self {
            Payload::Empty => {}
            Payload::Indexed { position, value } => {
                dst.put_u8(position);
                dst.put_f32_le(value);
            }
            Payload::Vector(values) => {
                for value in values {
                    dst.put_f32_le(value);
                }
            }
        }
    }

    /// The little-endian encoding as an owned buffer.
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.len());
        self.put(&mut buf);
        buf
    }
}

/// Encode floats as consecutive little-endian values.
pub fn encode_floats(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * FLOAT_SIZE);
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decode exactly `count` little-endian floats from `src`.
///
/// The buffer must hold exactly `4 * count` bytes; anything else is a
/// [`FrameError::ShortReply`].
pub fn decode_floats(src: &[u8], count: usize) -> Result<Vec<f32>> {
    let expected = count * FLOAT_SIZE;
    if src.len() != expected {
        return Err(FrameError::ShortReply {
            expected,
            received: src.len(),
        });
    }
    Ok(src
        .chunks_exact(FLOAT_SIZE)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
