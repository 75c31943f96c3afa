/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// The serial driver rejected an operation (buffer clear, timeout change).
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the byte stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// True when the error means the device or port went away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            TransportError::Closed => true,
            TransportError::Serial(err) | TransportError::Open { source: err, .. } => {
                err.kind() == serialport::ErrorKind::NoDevice
            }
            TransportError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::UnexpectedEof
            ),
        }
    }
}

impl TransportError {
    /// True when the OS refused access to the device node.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            TransportError::Serial(err) | TransportError::Open { source: err, .. } => {
                err.kind() == serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied)
            }
            TransportError::Io(err) => err.kind() == std::io::ErrorKind::PermissionDenied,
            TransportError::Closed => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
