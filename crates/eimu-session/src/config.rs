use std::time::Duration;

use eimu_frame::{BinaryCodec, Codec, TextCodec};
use eimu_transport::SerialConfig;
use serde::{Deserialize, Serialize};

/// Which encoding a session speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// `0xBB`-framed checksummed requests, raw float replies.
    #[default]
    Binary,
    /// Space-delimited text lines.
    Text,
}

impl WireFormat {
    /// Codec implementing this encoding.
    pub fn codec(self) -> Box<dyn Codec> {
        match self {
            WireFormat::Binary => Box::new(BinaryCodec),
            WireFormat::Text => Box::new(TextCodec),
        }
    }
}

/// Connect-time liveness probe settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Run the probe at all. Default: true.
    pub enabled: bool,
    /// Maximum probe exchanges before giving up. Default: 10.
    pub attempts: u32,
    /// Pause between failed attempts. Default: 100ms.
    pub interval: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            attempts: 10,
            interval: Duration::from_millis(100),
        }
    }
}

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Serial line settings.
    pub serial: SerialConfig,
    /// Wire encoding.
    pub wire: WireFormat,
    /// Position byte sent with indexed get/set requests. Default: 0.
    pub position: u8,
    /// Pause after opening the port; the board reboots when the port opens.
    /// Default: 3s.
    pub settle_delay: Duration,
    /// Liveness probe settings.
    pub probe: ProbeConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            wire: WireFormat::Binary,
            position: 0,
            settle_delay: Duration::from_secs(3),
            probe: ProbeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.serial.baud_rate, 115_200);
        assert_eq!(cfg.serial.read_timeout, Duration::from_millis(100));
        assert_eq!(cfg.probe.attempts, 10);
        assert_eq!(cfg.probe.interval, Duration::from_millis(100));
        assert_eq!(cfg.wire, WireFormat::Binary);
    }

    #[test]
    fn wire_format_selects_codec() {
        assert_eq!(WireFormat::Binary.codec().name(), "binary");
        assert_eq!(WireFormat::Text.codec().name(), "text");
        assert!(WireFormat::Text.codec().reply_is_framed());
    }
}
