//! Byte-stream transport abstraction for EIMU sessions.
//!
//! The protocol layers above only need three things from a transport:
//! - write bytes (and flush them onto the wire)
//! - read bytes, giving up after the configured read timeout
//! - discard unread input
//!
//! This is the lowest layer of the workspace. The serial implementation
//! wraps the `serialport` crate; a scripted in-memory transport is available
//! behind the `mock` feature for tests.

pub mod error;
pub mod serial;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{Result, TransportError};
pub use serial::{
    available_ports, PortInfo, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT,
};
pub use traits::Transport;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockHandle, MockTransport};
