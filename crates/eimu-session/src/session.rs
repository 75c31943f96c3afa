use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use eimu_frame::command::GET_FRAME_ID;
use eimu_frame::{Command, Payload};
use eimu_transport::{SerialTransport, Transport};
use tracing::{debug, info, warn};

use crate::config::{SessionConfig, WireFormat};
use crate::engine::Engine;
use crate::error::{Result, SessionError};

/// A connection to one EIMU device.
///
/// At most one engine is open per session. After [`Session::disconnect`]
/// every operation fails with [`SessionError::NotConnected`].
#[derive(Debug)]
pub struct Session {
    engine: Option<Engine>,
    port: String,
    config: SessionConfig,
}

impl Session {
    /// Open `port`, wait for the board to settle, then probe it.
    pub fn connect(port: &str, config: &SessionConfig) -> Result<Self> {
        let transport = SerialTransport::open(port, &config.serial)?;
        info!(port, baud = config.serial.baud_rate, wire = ?config.wire, "serial port opened");
        if !config.settle_delay.is_zero() {
            debug!(delay = ?config.settle_delay, "waiting for device to settle");
            thread::sleep(config.settle_delay);
        }
        Self::from_transport(Box::new(transport), config)
    }

    /// Build a session over an already-open transport and probe it.
    ///
    /// No settle delay is applied.
    pub fn from_transport(transport: Box<dyn Transport>, config: &SessionConfig) -> Result<Self> {
        let port = transport.name().to_string();
        let mut session = Self {
            engine: Some(Engine::new(transport, config.wire.codec())),
            port,
            config: config.clone(),
        };
        if config.probe.enabled {
            session.probe()?;
        }
        Ok(session)
    }

    /// Ask for the world frame id until the device answers.
    ///
    /// Exhausting every attempt closes the session.
    fn probe(&mut self) -> Result<()> {
        let attempts = self.config.probe.attempts;
        let payload = self.indexed_payload(0.0);
        for attempt in 1..=attempts {
            match self.request_array::<1>(&GET_FRAME_ID, &payload) {
                Ok([frame_id]) => {
                    info!(port = %self.port, attempt, frame_id, "device answered probe");
                    return Ok(());
                }
                Err(err) if err.is_recoverable() => {
                    debug!(attempt, error = %err, "probe unanswered");
                    if attempt < attempts {
                        thread::sleep(self.config.probe.interval);
                    }
                }
                Err(err) => {
                    self.disconnect();
                    return Err(err);
                }
            }
        }
        warn!(port = %self.port, attempts, "device never answered probe");
        self.disconnect();
        Err(SessionError::ConnectFailed {
            port: self.port.clone(),
            attempts,
        })
    }

    /// Close the transport. Calling it again is a no-op.
    pub fn disconnect(&mut self) {
        if let Some(engine) = self.engine.take() {
            drop(engine.into_transport());
            info!(port = %self.port, "session closed");
        }
    }

    /// True while the transport is open.
    pub fn is_connected(&self) -> bool {
        self.engine.is_some()
    }

    /// Port (or transport) name this session was opened on.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Wire encoding in use.
    pub fn wire_format(&self) -> WireFormat {
        self.config.wire
    }

    /// Configuration the session was opened with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The request/response engine, if the session is open.
    pub fn engine(&mut self) -> Result<&mut Engine> {
        self.engine.as_mut().ok_or(SessionError::NotConnected)
    }

    /// Indexed payload carrying the configured position byte.
    pub fn indexed_payload(&self, value: f32) -> Payload {
        Payload::Indexed {
            position: self.config.position,
            value,
        }
    }

    /// One exchange returning `count` floats.
    pub fn request_response(
        &mut self,
        command: &Command,
        payload: &Payload,
        count: usize,
    ) -> Result<Vec<f32>> {
        self.engine()?.request_response(command, payload, count)
    }

    /// One exchange returning exactly `N` floats.
    pub fn request_array<const N: usize>(
        &mut self,
        command: &Command,
        payload: &Payload,
    ) -> Result<[f32; N]> {
        self.engine()?.request_array::<N>(command, payload)
    }

    /// Send a request that has no reply.
    pub fn write_only(&mut self, command: &Command, payload: &Payload) -> Result<()> {
        self.engine()?.write_only(command, payload)
    }

    /// Wrap the session for use from several threads.
    pub fn into_shared(self) -> SharedSession {
        SharedSession(Arc::new(Mutex::new(self)))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// A session shared between threads.
///
/// Each call to [`SharedSession::with`] holds the lock for the whole
/// closure, so exchanges from different threads never interleave on the wire.
#[derive(Debug, Clone)]
pub struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    /// Run `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut self.lock())
    }

    /// True while the transport is open.
    pub fn is_connected(&self) -> bool {
        self.lock().is_connected()
    }

    /// Close the transport.
    pub fn disconnect(&self) {
        self.lock().disconnect();
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // A panic mid-exchange leaves stale input at worst; the next request
        // clears it.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use eimu_frame::command::READ_RPY;
    use eimu_transport::{MockHandle, MockTransport};

    use super::*;
    use crate::config::ProbeConfig;

    fn fast_config() -> SessionConfig {
        SessionConfig {
            probe: ProbeConfig {
                interval: Duration::from_millis(1),
                ..ProbeConfig::default()
            },
            ..SessionConfig::default()
        }
    }

    fn open() -> (Session, MockHandle) {
        let (transport, handle) = MockTransport::pair();
        handle.push_floats(&[0.0]);
        let session = Session::from_transport(Box::new(transport), &fast_config()).unwrap();
        (session, handle)
    }

    const PROBE_FRAME: [u8; 9] = [0xBB, 0x20, 0x05, 0, 0, 0, 0, 0, 0xE0];

    #[test]
    fn probe_succeeds_on_first_answer() {
        let (session, handle) = open();
        assert!(session.is_connected());
        assert_eq!(session.port(), "mock");
        assert_eq!(handle.requests(), vec![PROBE_FRAME.to_vec()]);
    }

    #[test]
    fn probe_retries_until_answered() {
        let (transport, handle) = MockTransport::pair();
        handle.push_silence();
        handle.push_silence();
        handle.push_floats(&[2.0]);
        let session = Session::from_transport(Box::new(transport), &fast_config()).unwrap();
        assert!(session.is_connected());
        assert_eq!(handle.requests().len(), 3);
    }

    #[test]
    fn probe_gives_up_after_ten_attempts() {
        let (transport, handle) = MockTransport::pair();
        let err = Session::from_transport(Box::new(transport), &fast_config()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::ConnectFailed { attempts: 10, .. }
        ));
        let requests = handle.requests();
        assert_eq!(requests.len(), 10);
        assert!(requests.iter().all(|r| r == &PROBE_FRAME));
    }

    #[test]
    fn probe_uses_configured_position() {
        let (transport, handle) = MockTransport::pair();
        handle.push_floats(&[0.0]);
        let config = SessionConfig {
            position: 100,
            ..fast_config()
        };
        Session::from_transport(Box::new(transport), &config).unwrap();
        assert_eq!(handle.requests()[0][3], 100);
    }

    #[test]
    fn probe_can_be_skipped() {
        let (transport, handle) = MockTransport::pair();
        let config = SessionConfig {
            probe: ProbeConfig {
                enabled: false,
                ..ProbeConfig::default()
            },
            ..SessionConfig::default()
        };
        let session = Session::from_transport(Box::new(transport), &config).unwrap();
        assert!(session.is_connected());
        assert!(handle.requests().is_empty());
    }

    #[test]
    fn closed_transport_aborts_probe() {
        let (transport, handle) = MockTransport::pair();
        handle.close();
        let err = Session::from_transport(Box::new(transport), &fast_config()).unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
    }

    #[test]
    fn operations_fail_after_disconnect() {
        let (mut session, _handle) = open();
        session.disconnect();
        session.disconnect();
        assert!(!session.is_connected());
        let err = session
            .request_response(&READ_RPY, &Payload::Empty, 3)
            .unwrap_err();
        assert!(matches!(err, SessionError::NotConnected));
    }

    #[test]
    fn connect_to_missing_port_fails() {
        let err = Session::connect("/dev/eimu-does-not-exist", &fast_config()).unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
    }

    #[test]
    fn shared_session_serializes_threads() {
        let (session, handle) = open();
        for i in 0..8 {
            handle.push_floats(&[i as f32, 0.0, 0.0]);
        }
        let shared = session.into_shared();
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..2 {
                        let values = shared
                            .with(|s| s.request_response(&READ_RPY, &Payload::Empty, 3))
                            .unwrap();
                        assert_eq!(values.len(), 3);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(handle.requests().len(), 9);
        shared.disconnect();
        assert!(!shared.is_connected());
    }
}
