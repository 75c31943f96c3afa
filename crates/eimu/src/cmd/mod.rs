use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use eimu_session::operations::{names, OperationKind};
use eimu_session::{ProbeConfig, Session, SessionConfig, WireFormat};
use eimu_transport::{SerialConfig, DEFAULT_BAUD_RATE};
use tracing::debug;

use crate::exit::{session_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod action;
pub mod commands;
pub mod info;
pub mod param;
pub mod ports;
pub mod read;
pub mod version;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports.
    Ports,
    /// Connect and print device parameters.
    Info(InfoArgs),
    /// Read a measurement.
    Read(ReadArgs),
    /// Read a device parameter.
    Get(GetArgs),
    /// Store a device parameter.
    Set(SetArgs),
    /// Write a calibration vector.
    Write(WriteArgs),
    /// Clear the device's filter buffers.
    Clear(ActionArgs),
    /// Restore factory parameters.
    Reset(ActionArgs),
    /// List every operation the device supports.
    Commands,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports => ports::run(format),
        Command::Info(args) => info::run(args, format),
        Command::Read(args) => read::run(args, format),
        Command::Get(args) => param::get(args, format),
        Command::Set(args) => param::set(args, format),
        Command::Write(args) => write::run(args, format),
        Command::Clear(args) => action::run("clear", args, format),
        Command::Reset(args) => action::run("reset", args, format),
        Command::Commands => commands::run(format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Wire {
    Binary,
    Text,
}

impl From<Wire> for WireFormat {
    fn from(wire: Wire) -> Self {
        match wire {
            Wire::Binary => WireFormat::Binary,
            Wire::Text => WireFormat::Text,
        }
    }
}

/// How to reach the device.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Serial port (e.g. /dev/ttyACM0, COM3).
    #[arg(env = "EIMU_PORT")]
    pub port: String,
    /// Baud rate.
    #[arg(long, env = "EIMU_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Reply window per exchange (e.g. 100ms, 1s).
    #[arg(long, env = "EIMU_TIMEOUT", default_value = "100ms")]
    pub timeout: String,
    /// Wire encoding.
    #[arg(long, value_enum, default_value = "binary")]
    pub wire: Wire,
    /// Position byte sent with parameter requests.
    #[arg(long, default_value_t = 0)]
    pub position: u8,
    /// Wait after opening the port while the board restarts (0 to skip).
    #[arg(long, default_value = "3s")]
    pub settle: String,
    /// Skip the connect-time liveness probe.
    #[arg(long)]
    pub no_probe: bool,
}

impl ConnectArgs {
    pub fn session_config(&self) -> CliResult<SessionConfig> {
        let read_timeout = parse_duration(&self.timeout)?;
        if read_timeout.is_zero() {
            return Err(CliError::new(USAGE, "timeout must be greater than zero"));
        }
        Ok(SessionConfig {
            serial: SerialConfig {
                baud_rate: self.baud,
                read_timeout,
            },
            wire: self.wire.into(),
            position: self.position,
            settle_delay: parse_duration(&self.settle)?,
            probe: ProbeConfig {
                enabled: !self.no_probe,
                ..ProbeConfig::default()
            },
        })
    }

    pub fn connect(&self) -> CliResult<Session> {
        let config = self.session_config()?;
        debug!(port = %self.port, ?config, "connecting");
        Session::connect(&self.port, &config).map_err(|err| session_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// What to read.
    #[arg(value_parser = clap::builder::PossibleValuesParser::new(names(OperationKind::Read)))]
    pub quantity: String,
    /// Number of samples; 0 streams until interrupted.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: u64,
    /// Pause between samples (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub interval: String,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Parameter to read.
    #[arg(value_parser = clap::builder::PossibleValuesParser::new(names(OperationKind::Get)))]
    pub param: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Parameter to store.
    #[arg(value_parser = clap::builder::PossibleValuesParser::new(names(OperationKind::Set)))]
    pub param: String,
    /// New value.
    #[arg(allow_negative_numbers = true)]
    pub value: f32,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Calibration vector to write.
    #[arg(value_parser = clap::builder::PossibleValuesParser::new(names(OperationKind::WriteVector)))]
    pub vector: String,
    #[arg(allow_negative_numbers = true)]
    pub x: f32,
    #[arg(allow_negative_numbers = true)]
    pub y: f32,
    #[arg(allow_negative_numbers = true)]
    pub z: f32,
    /// Read the vector back and compare.
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args, Debug)]
pub struct ActionArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `150ms` or bare seconds (`3`, `0.5`).
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(CliError::new(USAGE, format!("invalid duration: {input}")));
    }

    let secs = if millis { value / 1000.0 } else { value };
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("0.5").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn parse_duration_millis() {
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn connect_args_build_session_config() {
        let args = ConnectArgs {
            port: "/dev/ttyACM0".to_string(),
            baud: 57_600,
            timeout: "250ms".to_string(),
            wire: Wire::Text,
            position: 100,
            settle: "0".to_string(),
            no_probe: true,
        };
        let config = args.session_config().unwrap();
        assert_eq!(config.serial.baud_rate, 57_600);
        assert_eq!(config.serial.read_timeout, Duration::from_millis(250));
        assert_eq!(config.wire, WireFormat::Text);
        assert_eq!(config.position, 100);
        assert!(config.settle_delay.is_zero());
        assert!(!config.probe.enabled);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = ConnectArgs {
            port: "x".to_string(),
            baud: DEFAULT_BAUD_RATE,
            timeout: "0ms".to_string(),
            wire: Wire::Binary,
            position: 0,
            settle: "3s".to_string(),
            no_probe: false,
        };
        assert_eq!(args.session_config().unwrap_err().code, USAGE);
    }
}
