// ThemeLogger - emits theme events as structured tracing events
//
// Each event carries the details as individual fields so subscribers can
// filter on them: `theme`, `success`, `error`, `error_message`, and `details`
// (JSON text). Absent fields are simply not recorded.

use super::LogLevel;
use crate::details::ThemeLogDetails;
use tracing::Level;

/// Tracing target used for every theme event
pub const THEME_TARGET: &str = "theme";

// tracing needs the level at the callsite, so dispatch per level
macro_rules! theme_event {
    ($level:expr, $source:expr, $details:expr, $detail_json:expr, $message:expr) => {
        tracing::event!(
            target: THEME_TARGET,
            $level,
            source = $source,
            theme = $details.theme.as_deref(),
            success = $details.success,
            error = $details.error,
            error_message = $details.error_message.as_deref(),
            details = $detail_json.as_deref(),
            "{}",
            $message
        )
    };
}

/// Logger bound to a source (the component reporting theme events)
#[derive(Debug, Clone)]
pub struct ThemeLogger {
    source: String,
}

impl ThemeLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Emit a theme event at the given level
    pub fn log(&self, level: LogLevel, message: &str, details: &ThemeLogDetails) {
        let detail_json = details
            .details
            .as_ref()
            .and_then(|map| serde_json::to_string(map).ok());
        let source = self.source.as_str();

        match level {
            LogLevel::Error => theme_event!(Level::ERROR, source, details, detail_json, message),
            LogLevel::Warn => theme_event!(Level::WARN, source, details, detail_json, message),
            LogLevel::Info => theme_event!(Level::INFO, source, details, detail_json, message),
            LogLevel::Debug => theme_event!(Level::DEBUG, source, details, detail_json, message),
            LogLevel::Trace => theme_event!(Level::TRACE, source, details, detail_json, message),
        }
    }

    pub fn trace(&self, message: &str, details: &ThemeLogDetails) {
        self.log(LogLevel::Trace, message, details);
    }

    pub fn debug(&self, message: &str, details: &ThemeLogDetails) {
        self.log(LogLevel::Debug, message, details);
    }

    pub fn info(&self, message: &str, details: &ThemeLogDetails) {
        self.log(LogLevel::Info, message, details);
    }

    pub fn warn(&self, message: &str, details: &ThemeLogDetails) {
        self.log(LogLevel::Warn, message, details);
    }

    pub fn error(&self, message: &str, details: &ThemeLogDetails) {
        self.log(LogLevel::Error, message, details);
    }

    /// INFO event marked successful (an explicit `success` flag is kept)
    pub fn success(&self, message: &str, details: &ThemeLogDetails) {
        let mut details = details.clone();
        details.success.get_or_insert(true);
        self.log(LogLevel::Info, message, &details);
    }

    /// ERROR event marked failed (an explicit `error` flag is kept)
    pub fn failure(&self, message: &str, details: &ThemeLogDetails) {
        let mut details = details.clone();
        details.error.get_or_insert(true);
        self.log(LogLevel::Error, message, &details);
    }
}
