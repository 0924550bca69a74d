// Tracing subscriber setup
//
// Console output goes to stderr so command output on stdout stays clean.
// File output (optional) is always JSON lines through a non-blocking rolling
// appender; the returned guard must live until exit so buffered lines flush.
//
// Precedence: RUST_LOG env var > configured level

use crate::config::{LogFormat, LogRotation, LoggingConfig};
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the event filter from RUST_LOG, falling back to the configured level
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(level),
    }
}

/// Parse a configured level or directive list, ignoring RUST_LOG
pub fn parse_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("invalid log level directive {:?}", level))
}

fn file_appender(config: &LoggingConfig) -> tracing_appender::rolling::RollingFileAppender {
    match config.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&config.file_dir, &config.file_prefix)
        }
    }
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(&config.level)?;

    let pretty = (config.format == LogFormat::Pretty)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json = (config.format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    let (file_layer, guard) = if config.file_enabled {
        std::fs::create_dir_all(&config.file_dir).with_context(|| {
            format!(
                "could not create log directory {}",
                config.file_dir.display()
            )
        })?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(config));
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_levels_and_directives() {
        assert!(parse_filter("debug").is_ok());
        assert!(parse_filter("theme=trace,warn").is_ok());
    }

    #[test]
    fn test_filter_rejects_garbage() {
        assert!(parse_filter("theme=loud").is_err());
    }
}
