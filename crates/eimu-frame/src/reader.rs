use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::Codec;
use crate::error::{FrameError, Result};
use crate::payload::FLOAT_SIZE;
use crate::text::MAX_LINE;

const READ_CHUNK_SIZE: usize = 64;

/// Outcome of one reply read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyRead {
    /// The full reply arrived and decoded into the expected floats.
    Complete(Vec<f32>),
    /// The reply window closed before the reply was complete.
    Short { received: usize },
}

/// Reads fixed-arity replies from any `Read` stream.
///
/// Handles partial reads internally; callers get either every float of the
/// reply or a [`ReplyRead::Short`] telling them the stream needs a resync.
#[derive(Debug)]
pub struct ReplyReader {
    buf: BytesMut,
}

impl Default for ReplyReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyReader {
    /// Create a new reply reader.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_LINE),
        }
    }

    /// Read one reply of `count` floats, giving up once `window` has elapsed.
    ///
    /// A serial timeout (`TimedOut`/`WouldBlock`) or end of stream ends the
    /// read early and yields [`ReplyRead::Short`]. Other I/O errors propagate.
    pub fn read_reply<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        codec: &dyn Codec,
        count: usize,
        window: Duration,
    ) -> Result<ReplyRead> {
        self.buf.clear();
        if count == 0 {
            return Ok(ReplyRead::Complete(Vec::new()));
        }

        let deadline = Instant::now() + window;
        let complete = if codec.reply_is_framed() {
            self.fill_line(stream, deadline)?
        } else {
            self.fill_exact(stream, count * FLOAT_SIZE, deadline)?
        };

        if !complete {
            trace!(received = self.buf.len(), "reply window closed early");
            return Ok(ReplyRead::Short {
                received: self.buf.len(),
            });
        }

        trace!(bytes = ?self.buf.as_ref(), "reply received");
        codec.decode_reply(&self.buf, count).map(ReplyRead::Complete)
    }

    /// Raw bytes of the most recent reply, complete or not.
    pub fn last_reply(&self) -> &[u8] {
        &self.buf
    }

    fn fill_exact<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        expected: usize,
        deadline: Instant,
    ) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        while self.buf.len() < expected {
            let want = (expected - self.buf.len()).min(READ_CHUNK_SIZE);
            match read_chunk(stream, &mut chunk[..want])? {
                Some(n) => self.buf.extend_from_slice(&chunk[..n]),
                None => return Ok(false),
            }
            if self.buf.len() < expected && Instant::now() >= deadline {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn fill_line<R: Read + ?Sized>(&mut self, stream: &mut R, deadline: Instant) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let n = match read_chunk(stream, &mut chunk)? {
                Some(n) => n,
                None => return Ok(false),
            };
            if let Some(end) = chunk[..n].iter().position(|b| *b == b'\n') {
                // Anything after the newline is unsolicited; the next request
                // clears the input buffer before it is written.
                self.buf.extend_from_slice(&chunk[..end]);
                return Ok(true);
            }
            self.buf.extend_from_slice(&chunk[..n]);
            if self.buf.len() > MAX_LINE {
                return Err(FrameError::MalformedReply(format!(
                    "reply line exceeds {MAX_LINE} bytes"
                )));
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
        }
    }
}

/// One read call. `None` means the window closed or the stream ended.
fn read_chunk<R: Read + ?Sized>(stream: &mut R, chunk: &mut [u8]) -> Result<Option<usize>> {
    loop {
        match stream.read(chunk) {
            Ok(0) => return Ok(None),
            Ok(n) => return Ok(Some(n)),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                return Ok(None)
            }
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::BinaryCodec;
    use crate::payload::encode_floats;
    use crate::text::TextCodec;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn read_exact_float_reply() {
        let wire = encode_floats(&[1.0, 2.0, 3.0]);
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(&mut Cursor::new(wire), &BinaryCodec, 3, WINDOW)
            .unwrap();
        assert_eq!(got, ReplyRead::Complete(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn read_stops_at_expected_length() {
        let mut wire = encode_floats(&[4.0]);
        wire.extend_from_slice(&encode_floats(&[5.0]));
        let mut stream = Cursor::new(wire);
        let mut reader = ReplyReader::new();

        let first = reader
            .read_reply(&mut stream, &BinaryCodec, 1, WINDOW)
            .unwrap();
        let second = reader
            .read_reply(&mut stream, &BinaryCodec, 1, WINDOW)
            .unwrap();

        assert_eq!(first, ReplyRead::Complete(vec![4.0]));
        assert_eq!(second, ReplyRead::Complete(vec![5.0]));
    }

    #[test]
    fn nine_float_reply_reads_36_bytes() {
        let values: Vec<f32> = (0..9).map(|i| i as f32 * 0.5).collect();
        let mut stream = Cursor::new(encode_floats(&values));
        let mut reader = ReplyReader::new();

        let got = reader
            .read_reply(&mut stream, &BinaryCodec, 9, WINDOW)
            .unwrap();

        assert_eq!(got, ReplyRead::Complete(values));
        assert_eq!(reader.last_reply().len(), 36);
        assert_eq!(stream.position(), 36);
    }

    #[test]
    fn short_reply_at_eof() {
        let wire = encode_floats(&[1.0, 2.0]);
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(&mut Cursor::new(wire), &BinaryCodec, 3, WINDOW)
            .unwrap();
        assert_eq!(got, ReplyRead::Short { received: 8 });
    }

    #[test]
    fn timeout_with_no_data_is_short() {
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(&mut TimeoutReader, &BinaryCodec, 4, WINDOW)
            .unwrap();
        assert_eq!(got, ReplyRead::Short { received: 0 });
    }

    #[test]
    fn partial_read_handling() {
        let mut stream = ByteByByteReader {
            bytes: encode_floats(&[7.5, -7.5]),
            pos: 0,
        };
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(&mut stream, &BinaryCodec, 2, WINDOW)
            .unwrap();
        assert_eq!(got, ReplyRead::Complete(vec![7.5, -7.5]));
    }

    #[test]
    fn interrupted_read_retries() {
        let mut stream = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(encode_floats(&[1.25])),
        };
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(&mut stream, &BinaryCodec, 1, WINDOW)
            .unwrap();
        assert_eq!(got, ReplyRead::Complete(vec![1.25]));
    }

    #[test]
    fn hard_io_error_propagates() {
        let mut reader = ReplyReader::new();
        let err = reader
            .read_reply(&mut BrokenReader, &BinaryCodec, 1, WINDOW)
            .unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn zero_arity_reads_nothing() {
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(&mut BrokenReader, &BinaryCodec, 0, WINDOW)
            .unwrap();
        assert_eq!(got, ReplyRead::Complete(Vec::new()));
    }

    #[test]
    fn text_reply_line() {
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(
                &mut Cursor::new(b"0.5 -1 2.25\r\n".to_vec()),
                &TextCodec,
                3,
                WINDOW,
            )
            .unwrap();
        assert_eq!(got, ReplyRead::Complete(vec![0.5, -1.0, 2.25]));
    }

    #[test]
    fn text_reply_without_newline_is_short() {
        let mut reader = ReplyReader::new();
        let got = reader
            .read_reply(&mut Cursor::new(b"0.5 -1".to_vec()), &TextCodec, 3, WINDOW)
            .unwrap();
        assert_eq!(got, ReplyRead::Short { received: 6 });
    }

    #[test]
    fn text_reply_overlong_line_rejected() {
        let mut reader = ReplyReader::new();
        let err = reader
            .read_reply(
                &mut Cursor::new(vec![b'1'; MAX_LINE * 2]),
                &TextCodec,
                1,
                WINDOW,
            )
            .unwrap_err();
        assert!(matches!(err, FrameError::MalformedReply(_)));
    }

    struct TimeoutReader;

    impl Read for TimeoutReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::TimedOut))
        }
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }
}
