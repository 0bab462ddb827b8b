use std::io::IsTerminal;

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding extra filter directives, e.g.
/// `packetio_frame=trace` to see scratch buffer growth.
const DIRECTIVES_ENV: &str = "RUST_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// `level` as the fallback, refined by any `directives` that parse.
fn frame_filter(level: LogLevel, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Send dump/encode diagnostics to stderr so stdout stays frame output only.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let directives = std::env::var(DIRECTIVES_ENV).ok();
    let stderr = std::io::stderr();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(frame_filter(level, directives.as_deref()))
        .with_ansi(matches!(format, LogFormat::Text) && stderr.is_terminal())
        .with_target(false)
        .with_writer(std::io::stderr);

    // Only fails when a subscriber is already set; that one stays.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
