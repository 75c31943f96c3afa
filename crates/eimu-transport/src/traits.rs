use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// A duplex byte stream that an EIMU session talks through.
///
/// Reads honour the configured read timeout: a read that sees no data within
/// the window fails with `io::ErrorKind::TimedOut` (or returns a short count),
/// it never blocks forever.
pub trait Transport: Read + Write + Send {
    /// Discard any bytes received but not yet read.
    fn clear_input(&mut self) -> Result<()>;

    /// The current per-read timeout.
    fn read_timeout(&self) -> Duration;

    /// Human-readable transport name for diagnostics (usually the port path).
    fn name(&self) -> &str;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn clear_input(&mut self) -> Result<()> {
        (**self).clear_input()
    }

    fn read_timeout(&self) -> Duration {
        (**self).read_timeout()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
