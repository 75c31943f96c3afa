use std::time::Duration;

use eimu_frame::{Codec, Command, Payload, ReplyRead, ReplyReader, RequestWriter};
use eimu_transport::Transport;
use tracing::{debug, trace, warn};

use crate::error::{Result, SessionError};
use crate::reading::is_ack;

/// Strict request/response exchange over one transport.
///
/// Every request starts by discarding whatever is waiting in the receive
/// buffer, so a late reply from an earlier exchange can never be mistaken for
/// the answer to this one. A reply that does not fully arrive within the
/// window clears the input again and fails the exchange. There are no
/// internal retries.
pub struct Engine {
    transport: Box<dyn Transport>,
    codec: Box<dyn Codec>,
    writer: RequestWriter,
    reader: ReplyReader,
    reply_window: Duration,
}

impl Engine {
    /// Create an engine. A reply may take as long as the transport's read
    /// timeout to arrive in full.
    pub fn new(transport: Box<dyn Transport>, codec: Box<dyn Codec>) -> Self {
        let reply_window = transport.read_timeout();
        Self {
            transport,
            codec,
            writer: RequestWriter::new(),
            reader: ReplyReader::new(),
            reply_window,
        }
    }

    /// Clear pending input, then write and flush one request.
    pub fn send(&mut self, command: &Command, payload: &Payload) -> Result<()> {
        if payload.shape() != command.shape {
            return Err(SessionError::InvalidArgument(format!(
                "{command} takes a {:?} payload, not {:?}",
                command.shape,
                payload.shape()
            )));
        }
        self.transport.clear_input()?;
        let written = self.writer.send(
            self.transport.as_mut(),
            self.codec.as_ref(),
            command,
            payload,
        )?;
        trace!(command = %command, written, "request sent");
        Ok(())
    }

    /// Read exactly `count` floats.
    ///
    /// On a short or undecodable reply the input buffer is cleared before the
    /// error is returned, leaving the stream aligned for the next request.
    pub fn recv_floats(&mut self, count: usize) -> Result<Vec<f32>> {
        let outcome = self.reader.read_reply(
            self.transport.as_mut(),
            self.codec.as_ref(),
            count,
            self.reply_window,
        );
        match outcome {
            Ok(ReplyRead::Complete(values)) => Ok(values),
            Ok(ReplyRead::Short { received }) => {
                warn!(
                    expected = count,
                    received,
                    transport = self.transport.name(),
                    "short reply, resynchronizing"
                );
                self.resync();
                Err(SessionError::Timeout {
                    arity: count,
                    received,
                })
            }
            Err(err) => {
                warn!(error = %err, "unreadable reply, resynchronizing");
                self.resync();
                Err(err.into())
            }
        }
    }

    /// One full exchange: send `command`, then read its `count` reply floats.
    pub fn request_response(
        &mut self,
        command: &Command,
        payload: &Payload,
        count: usize,
    ) -> Result<Vec<f32>> {
        if count != command.reply_arity {
            return Err(SessionError::InvalidArgument(format!(
                "{command} answers with {} values, not {count}",
                command.reply_arity
            )));
        }
        self.send(command, payload)?;
        let values = self.recv_floats(count)?;
        debug!(command = %command, ?values, "exchange complete");
        Ok(values)
    }

    /// Fixed-size variant of [`Engine::request_response`].
    pub fn request_array<const N: usize>(
        &mut self,
        command: &Command,
        payload: &Payload,
    ) -> Result<[f32; N]> {
        let values = self.request_response(command, payload, N)?;
        <[f32; N]>::try_from(values).map_err(|values| {
            SessionError::Frame(eimu_frame::FrameError::MalformedReply(format!(
                "expected {N} values, got {}",
                values.len()
            )))
        })
    }

    /// Send a request whose reply carries no data.
    ///
    /// The binary device stays silent after a vector write. A line-framed
    /// device answers every request, so its one-value acknowledgement is read
    /// and checked before returning.
    pub fn write_only(&mut self, command: &Command, payload: &Payload) -> Result<()> {
        self.send(command, payload)?;
        if !self.codec.reply_is_framed() {
            debug!(command = %command, "request written, no reply expected");
            return Ok(());
        }
        let ack = self.recv_floats(1)?.first().copied().unwrap_or_default();
        if !is_ack(ack) {
            return Err(SessionError::Rejected {
                command: command.name,
                ack,
            });
        }
        debug!(command = %command, "write acknowledged");
        Ok(())
    }

    /// Discard pending input. Failures are logged, not returned; the caller is
    /// already reporting a more specific error.
    fn resync(&mut self) {
        if let Err(err) = self.transport.clear_input() {
            warn!(error = %err, "failed to clear input during resync");
        }
    }

    /// Release the transport.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("transport", &self.transport.name())
            .field("codec", &self.codec.name())
            .field("reply_window", &self.reply_window)
            .finish()
    }
}
