/// Errors that can occur while framing requests or decoding replies.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer reply bytes arrived than the command's arity requires.
    #[error("short reply ({received} of {expected} bytes)")]
    ShortReply { expected: usize, received: usize },

    /// A text reply line could not be parsed into the expected floats.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// An I/O error occurred while writing a request or reading a reply.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream accepted zero bytes of a request.
    #[error("connection closed (incomplete request)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
