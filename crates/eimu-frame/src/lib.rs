//! Request framing and reply decoding for the EIMU serial protocol.
//!
//! Every request is framed with:
//! - A start marker byte (`0xBB`)
//! - The command opcode
//! - A one-byte payload length
//! - The payload (a position byte and/or little-endian floats)
//! - An 8-bit additive checksum over everything before it
//!
//! Replies are not framed: a reply is exactly `4 * n` bytes of little-endian
//! floats, where `n` is fixed by the command that was sent. A plain-text line
//! variant of the same protocol is available as [`TextCodec`].

pub mod codec;
pub mod command;
pub mod error;
pub mod payload;
pub mod reader;
pub mod text;
pub mod writer;

pub use codec::{
    checksum, encode_frame, encode_no_payload, BinaryCodec, Codec, Frame, FRAME_OVERHEAD,
    HEADER_SIZE, MAX_PAYLOAD, START_BYTE,
};
pub use command::{Access, Command, RequestShape};
pub use error::{FrameError, Result};
pub use payload::{decode_floats, encode_floats, Payload, FLOAT_SIZE};
pub use reader::{ReplyRead, ReplyReader};
pub use text::TextCodec;
pub use writer::RequestWriter;
