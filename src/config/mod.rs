//! Configuration for theme event logging
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/theme-log/config.toml)
//! 3. Built-in defaults (lowest priority)

use crate::conformance::Conformance;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

mod logging;

#[cfg(test)]
mod tests;

pub use logging::{FileLogging, LogFormat, LogRotation, LoggingConfig};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Environment Variables
// ─────────────────────────────────────────────────────────────────────────────

/// Overrides the config file location
pub const ENV_CONFIG: &str = "THEME_LOG_CONFIG";
pub const ENV_LEVEL: &str = "THEME_LOG_LEVEL";
pub const ENV_FORMAT: &str = "THEME_LOG_FORMAT";
pub const ENV_CONFORMANCE: &str = "THEME_LOG_CONFORMANCE";

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure to load configuration
#[derive(Debug)]
pub enum ConfigError {
    /// File exists but could not be read
    Read { path: PathBuf, source: std::io::Error },
    /// File is not valid TOML for this config
    Parse { path: PathBuf, message: String },
    /// A setting has a value outside its allowed set
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config file {}: {}", path.display(), source)
            }
            Self::Parse { path, message } => {
                write!(f, "invalid config file {}: {}", path.display(), message)
            }
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value {:?} for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for how incoming details are checked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsConfig {
    /// Policy for undeclared top-level fields
    pub conformance: Conformance,
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub details: DetailsConfig,
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileDetails {
    pub conformance: Option<String>,
}

/// Config file structure
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// Optional [details] section
    pub details: Option<FileDetails>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Default config file path: ~/.config/theme-log/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("theme-log").join("config.toml"))
    }

    /// Config file path, honoring the THEME_LOG_CONFIG override
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(ENV_CONFIG)
            .map(PathBuf::from)
            .or_else(Self::default_path)
    }

    /// Read and parse the config file; a missing file yields defaults
    fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_file_config(path, &contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn parse_file_config(path: &Path, contents: &str) -> Result<FileConfig, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load configuration: env vars > file > defaults
    pub fn load() -> Result<Self, ConfigError> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file_config(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Load from an explicit file path (env vars still apply)
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = Self::load_file_config(path)?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge file settings with environment lookups
    pub(crate) fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut logging = LoggingConfig::from_file(file.logging)?;

        // Level: env > file > default
        if let Some(level) = env(ENV_LEVEL) {
            logging.level = level;
        }

        // Format: env > file > default
        if let Some(format) = env(ENV_FORMAT) {
            logging.format = LogFormat::parse(&format).ok_or(ConfigError::InvalidValue {
                key: ENV_FORMAT,
                value: format,
            })?;
        }

        // Conformance: env > file > default
        let conformance = match env(ENV_CONFORMANCE).or(file.details.and_then(|d| d.conformance))
        {
            Some(name) => Conformance::parse(&name).ok_or(ConfigError::InvalidValue {
                key: "details.conformance",
                value: name,
            })?,
            None => Conformance::default(),
        };

        Ok(Self {
            logging,
            details: DetailsConfig { conformance },
        })
    }

    /// Render as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# theme-log configuration

# Logging configuration (RUST_LOG env var overrides the level)
[logging]
level = "{level}"
format = "{format}"  # pretty, json
# File logging (JSON lines, in addition to console output)
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_rotation = "{file_rotation}"  # hourly, daily, never
file_prefix = "{file_prefix}"

# Theme log details checking
[details]
conformance = "{conformance}"  # strict: reject unknown fields, open: fold them into details
"#,
            level = self.logging.level,
            format = self.logging.format.as_str(),
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display().to_string().replace('\\', "/"),
            file_rotation = self.logging.file_rotation.as_str(),
            file_prefix = self.logging.file_prefix,
            conformance = self.details.conformance.as_str(),
        )
    }
}
