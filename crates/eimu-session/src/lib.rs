//! Session layer for EIMU devices.
//!
//! Owns the request/response engine, the connect-time liveness probe and the
//! typed operations (`read_rpy`, `set_filter_gain`, ...). One session owns one
//! serial port exclusively; use [`SharedSession`] to share it between threads.
//!
//! ```no_run
//! use eimu_session::{Session, SessionConfig};
//!
//! let mut session = Session::connect("/dev/ttyACM0", &SessionConfig::default())?;
//! let rpy = session.read_rpy();
//! if rpy.success() {
//!     println!("yaw = {}", rpy.value().yaw);
//! }
//! # Ok::<(), eimu_session::SessionError>(())
//! ```

mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod operations;
pub mod reading;
pub mod session;
pub mod types;

pub use config::{ProbeConfig, SessionConfig, WireFormat};
pub use engine::Engine;
pub use error::{Result, SessionError};
pub use operations::{Operation, OperationKind, Transform, OPERATIONS};
pub use reading::{is_ack, round_to, truncate_id, Reading, MOTION_DECIMALS, TUNING_DECIMALS};
pub use session::{SharedSession, Session};
pub use types::{AccelGyro, ImuData, MatrixRow, QuatRpy, Quaternion, Rpy, Vec3};
