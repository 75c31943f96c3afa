//! Host-side driver for EIMU inertial measurement units.
//!
//! The device speaks a small request/response protocol over a serial line:
//! checksummed request frames out, fixed-size float replies back.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial byte stream abstraction
//! - [`frame`]: Request framing, command registry and reply decoding
//! - [`session`]: Request/response engine, connection lifecycle and typed
//!   operations (behind the default `session` feature)
//!
//! ```no_run
//! use eimu::session::{Session, SessionConfig};
//!
//! let mut imu = Session::connect("/dev/ttyACM0", &SessionConfig::default())?;
//! let (ok, data) = imu.read_imu_data().into_parts();
//! if ok {
//!     println!("{:?}", data.rpy);
//! }
//! # Ok::<(), eimu::session::SessionError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use eimu_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use eimu_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use eimu_session::*;
}
