//! Scripted in-memory transport.
//!
//! Each flushed request releases the next scripted reply into the receive
//! buffer, which is how a real device answers after the request hits the
//! wire. Reading from an empty receive buffer fails with `TimedOut`, the same
//! way a serial port does when its read window expires.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

#[derive(Debug, Default)]
struct MockState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    requests: Vec<Vec<u8>>,
    input_clears: usize,
    fail_next_write: Option<ErrorKind>,
    closed: bool,
}

/// Transport half handed to the code under test.
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    timeout: Duration,
    name: String,
}

/// Test-side handle for scripting replies and inspecting traffic.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a connected transport/handle pair.
    pub fn pair() -> (MockTransport, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            MockTransport {
                state: Arc::clone(&state),
                timeout: Duration::from_millis(100),
                name: "mock".to_string(),
            },
            MockHandle { state },
        )
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MockHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue raw bytes released after the next flushed request.
    pub fn push_reply(&self, bytes: impl Into<Vec<u8>>) {
        self.state().replies.push_back(bytes.into());
    }

    /// Queue a little-endian float reply.
    pub fn push_floats(&self, values: &[f32]) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_reply(bytes);
    }

    /// Queue an empty reply: the request goes unanswered.
    pub fn push_silence(&self) {
        self.push_reply(Vec::new());
    }

    /// Put bytes straight into the receive buffer, as if left over from an
    /// earlier exchange.
    pub fn inject_stale(&self, bytes: &[u8]) {
        self.state().rx.extend(bytes.iter().copied());
    }

    /// Fail the next write with the given I/O error kind.
    pub fn fail_next_write(&self, kind: ErrorKind) {
        self.state().fail_next_write = Some(kind);
    }

    /// Make every subsequent operation report a closed transport.
    pub fn close(&self) {
        self.state().closed = true;
    }

    /// All requests flushed so far, one entry per flush.
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.state().requests.clone()
    }

    /// The most recent flushed request.
    pub fn last_request(&self) -> Option<Vec<u8>> {
        self.state().requests.last().cloned()
    }

    /// How many times the receive buffer was discarded.
    pub fn input_clears(&self) -> usize {
        self.state().input_clears
    }

    /// Bytes still waiting in the receive buffer.
    pub fn pending_input(&self) -> usize {
        self.state().rx.len()
    }

    /// Scripted replies not yet released.
    pub fn pending_replies(&self) -> usize {
        self.state().replies.len()
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut state = self.state();
        if state.closed {
            return Ok(0);
        }
        if state.rx.is_empty() {
            return Err(std::io::Error::new(
                ErrorKind::TimedOut,
                "operation timed out",
            ));
        }
        let n = buf.len().min(state.rx.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state();
        if state.closed {
            return Err(std::io::Error::from(ErrorKind::BrokenPipe));
        }
        if let Some(kind) = state.fail_next_write.take() {
            return Err(std::io::Error::from(kind));
        }
        state.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut state = self.state();
        if state.closed {
            return Err(std::io::Error::from(ErrorKind::BrokenPipe));
        }
        if state.tx.is_empty() {
            return Ok(());
        }
        let request = std::mem::take(&mut state.tx);
        state.requests.push(request);
        if let Some(reply) = state.replies.pop_front() {
            state.rx.extend(reply);
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn clear_input(&mut self) -> Result<()> {
        let mut state = self.state();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.rx.clear();
        state.input_clears += 1;
        Ok(())
    }

    fn read_timeout(&self) -> Duration {
        self.timeout
    }

    fn name(&self) -> &str {
        &self.name
    }
}
