use bytes::{BufMut, Bytes, BytesMut};

use crate::command::Command;
use crate::error::Result;
use crate::payload::{decode_floats, Payload};

/// Start marker that opens every request.
pub const START_BYTE: u8 = 0xBB;

/// Request header: start (1) + command (1) + length (1) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Trailing checksum byte.
pub const CHECKSUM_SIZE: usize = 1;

/// Bytes a binary request adds around its payload.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// One request unit as placed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Opcode byte.
    pub command: u8,
    /// Raw payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    /// The checksum byte this frame carries.
    pub fn checksum(&self) -> u8 {
        let header = [START_BYTE, self.command, self.payload.len() as u8];
        checksum(&header).wrapping_add(checksum(&self.payload))
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.command, &self.payload, &mut buf);
        buf.freeze()
    }
}

/// Unsigned 8-bit sum of `bytes`, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encode a request frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬──────────┬──────────────────┬──────────┐
/// │ Start    │ Command  │ Length   │ Payload          │ Checksum │
/// │ 0xBB     │ (1B)     │ (1B)     │ (Length bytes)   │ (1B)     │
/// └──────────┴──────────┴──────────┴──────────────────┴──────────┘
/// ```
/// The checksum is the wrapping sum of every preceding byte.
///
/// # Panics
///
/// Panics if `payload` is longer than [`MAX_PAYLOAD`]. Every payload shape the
/// protocol defines is at most 12 bytes, so a longer one is a caller bug.
pub fn encode_frame(command: u8, payload: &[u8], dst: &mut BytesMut) {
    assert!(
        payload.len() <= MAX_PAYLOAD,
        "payload of {} bytes does not fit the length byte",
        payload.len()
    );
    let start = dst.len();
    dst.reserve(FRAME_OVERHEAD + payload.len());
    dst.put_u8(START_BYTE);
    dst.put_u8(command);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    let sum = checksum(&dst[start..]);
    dst.put_u8(sum);
}

/// Encode a request frame with no payload (`len = 0`).
pub fn encode_no_payload(command: u8, dst: &mut BytesMut) {
    encode_frame(command, &[], dst);
}

/// Capability set of a wire encoding.
///
/// The request/response engine is written against this trait so the binary
/// and text variants of the protocol share one exchange implementation.
pub trait Codec: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Append the encoded request for `command` to `dst`.
    ///
    /// The payload is encoded as given; callers check it against
    /// `command.shape` first.
    fn encode(&self, command: &Command, payload: &Payload, dst: &mut BytesMut);

    /// Bytes added around the payload of every request.
    fn frame_overhead(&self) -> usize;

    /// True when replies carry their own delimiter; false when a reply is a
    /// bare run of `4 * n` bytes whose size the caller must already know.
    fn reply_is_framed(&self) -> bool;

    /// Decode a complete reply into exactly `count` floats.
    fn decode_reply(&self, src: &[u8], count: usize) -> Result<Vec<f32>>;
}

/// The reference binary encoding: `0xBB`-framed checksummed requests,
/// unframed little-endian float replies.
///
/// Replies are never checksum-verified; the device does not send one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn encode(&self, command: &Command, payload: &Payload, dst: &mut BytesMut) {
        let bytes = payload.to_bytes();
        encode_frame(command.opcode, &bytes, dst);
    }

    fn frame_overhead(&self) -> usize {
        FRAME_OVERHEAD
    }

    fn reply_is_framed(&self) -> bool {
        false
    }

    fn decode_reply(&self, src: &[u8], count: usize) -> Result<Vec<f32>> {
        decode_floats(src, count)
    }
}
