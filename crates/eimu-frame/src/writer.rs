use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::Codec;
use crate::command::Command;
use crate::error::{FrameError, Result};
use crate::payload::Payload;

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Encodes requests and pushes them onto any `Write` stream.
///
/// The encode buffer is reused across requests.
#[derive(Debug)]
pub struct RequestWriter {
    buf: BytesMut,
}

impl Default for RequestWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestWriter {
    /// Create a new request writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode, write and flush one request (blocking).
    ///
    /// Returns the number of bytes put on the wire.
    pub fn send<W: Write + ?Sized>(
        &mut self,
        stream: &mut W,
        codec: &dyn Codec,
        command: &Command,
        payload: &Payload,
    ) -> Result<usize> {
        self.buf.clear();
        codec.encode(command, payload, &mut self.buf);
        trace!(command = %command, bytes = ?self.buf.as_ref(), "writing request");

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match stream.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        flush(stream)?;
        Ok(self.buf.len())
    }

    /// Bytes of the most recently encoded request.
    pub fn last_request(&self) -> &[u8] {
        &self.buf
    }
}

/// Flush the underlying stream so the request is actually on the wire.
pub fn flush<W: Write + ?Sized>(stream: &mut W) -> Result<()> {
    loop {
        match stream.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}
