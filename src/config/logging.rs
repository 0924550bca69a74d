//! Logging configuration: level, output format, file output, rotation

use serde::Deserialize;
use std::path::PathBuf;

use super::ConfigError;

// ─────────────────────────────────────────────────────────────────────────────
// Log Rotation
// ─────────────────────────────────────────────────────────────────────────────

/// Log file rotation strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// Single log file
    Never,
}

impl LogRotation {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output Format
// ─────────────────────────────────────────────────────────────────────────────

/// Console output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    pub format: LogFormat,
    /// Also write JSON lines to rolling files
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// Prefix for log file names (e.g. "theme-log" -> "theme-log.2026-10-17")
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "theme-log".to_string(),
        }
    }
}

/// Logging settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileLogging>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let format = match file.format {
            Some(s) => LogFormat::parse(&s).ok_or_else(|| ConfigError::InvalidValue {
                key: "logging.format",
                value: s,
            })?,
            None => defaults.format,
        };

        let file_rotation = match file.file_rotation {
            Some(s) => LogRotation::parse(&s).ok_or_else(|| ConfigError::InvalidValue {
                key: "logging.file_rotation",
                value: s,
            })?,
            None => defaults.file_rotation,
        };

        Ok(Self {
            level: file.level.unwrap_or(defaults.level),
            format,
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file
                .file_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.file_dir),
            file_rotation,
            file_prefix: file.file_prefix.unwrap_or(defaults.file_prefix),
        })
    }
}
