//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the level comes from the verbosity
//! flag. Log lines go to stderr so stdout stays clean for tables.

use crate::error::CliError;
use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Human-readable multi-field lines
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON lines
    Json,
}

/// Default filter directive for a verbosity count.
pub(crate) const fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
pub(crate) fn init_logging(format: LogFormat, verbose: u8) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| CliError::Logging(e.to_string()))
}
