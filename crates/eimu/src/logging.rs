use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::{self, time::Uptime};
use tracing_subscriber::prelude::*;

/// Crates whose events reach stderr.
const DRIVER_TARGETS: [&str; 4] = ["eimu", "eimu_session", "eimu_frame", "eimu_transport"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    /// One line per exchange.
    Debug,
    /// Raw request and reply bytes.
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Events from the driver crates at `level`; everything else is dropped.
fn driver_filter(level: LogLevel) -> Targets {
    Targets::new().with_targets(DRIVER_TARGETS.map(|target| (target, LevelFilter::from(level))))
}

/// Install the stderr subscriber. Stdout carries readings only.
///
/// Timestamps are time since start, so reply-window stalls show up as gaps
/// between consecutive exchange lines.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_timer(Uptime::default())
        .with_target(level >= LogLevel::Debug);
    let filter = driver_filter(level);

    let _ = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(layer.json().with_filter(filter))
            .try_init(),
    };
}
