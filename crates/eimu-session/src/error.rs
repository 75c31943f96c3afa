use eimu_frame::FrameError;
use eimu_transport::TransportError;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The reply did not arrive, or arrived short, within the read window.
    #[error("reply timed out ({received} bytes received, {arity} floats expected)")]
    Timeout { arity: usize, received: usize },

    /// The operation needs an open session and there is none.
    #[error("no open session")]
    NotConnected,

    /// Transport-level fault.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A reply arrived but could not be decoded.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// The device acknowledged a write with something other than 1.
    #[error("{command} rejected by device (ack {ack})")]
    Rejected { command: &'static str, ack: f32 },

    /// Arguments do not fit the operation's request shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The liveness probe never got an answer.
    #[error("device on {port} did not answer after {attempts} attempts")]
    ConnectFailed { port: String, attempts: u32 },
}

impl SessionError {
    /// True for failures scoped to one exchange (the session stays usable).
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::Timeout { .. }
            | SessionError::Frame(_)
            | SessionError::Rejected { .. }
            | SessionError::InvalidArgument(_) => true,
            SessionError::Transport(err) => !err.is_disconnect(),
            SessionError::NotConnected | SessionError::ConnectFailed { .. } => false,
        }
    }
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(io) => SessionError::Transport(TransportError::Io(io)),
            FrameError::ConnectionClosed => SessionError::Transport(TransportError::Closed),
            other => SessionError::Frame(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_io_becomes_transport_fault() {
        let err: SessionError =
            FrameError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)).into();
        assert!(matches!(err, SessionError::Transport(TransportError::Io(_))));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn malformed_reply_stays_frame_error() {
        let err: SessionError = FrameError::MalformedReply("bad".to_string()).into();
        assert!(matches!(err, SessionError::Frame(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn timeout_is_recoverable() {
        let err = SessionError::Timeout {
            arity: 3,
            received: 0,
        };
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "reply timed out (0 bytes received, 3 floats expected)"
        );
    }
}
