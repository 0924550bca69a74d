// Logging module - theme event emission and in-memory capture
//
// Theme events go out through `tracing` with structured fields (see logger.rs).
// The capture layer here records every event into a bounded buffer, keeping
// the structured fields, so the most recent theme events can be inspected
// without a file or terminal sink.

mod logger;

pub use logger::{ThemeLogger, THEME_TARGET};

use crate::details::ThemeLogDetails;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Maximum number of log entries to keep in memory
pub const MAX_LOG_ENTRIES: usize = 1000;

/// A single log entry captured from tracing
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// The tracing target (`theme` for theme events)
    pub target: String,
    pub message: String,
    /// Every recorded field except `message`
    pub fields: Map<String, Value>,
}

impl LogEntry {
    /// The `source` field recorded by [`ThemeLogger`], if any
    pub fn source(&self) -> Option<&str> {
        self.fields.get("source").and_then(Value::as_str)
    }

    /// Rebuild the theme details carried by this entry
    ///
    /// `details` travels as JSON text; anything that does not parse back to an
    /// object is dropped.
    pub fn theme_details(&self) -> ThemeLogDetails {
        let bool_of = |key: &str| self.fields.get(key).and_then(Value::as_bool);
        let string_of = |key: &str| {
            self.fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let details = self
            .fields
            .get("details")
            .and_then(Value::as_str)
            .and_then(|text| serde_json::from_str::<Value>(text).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            });

        ThemeLogDetails {
            success: bool_of("success"),
            error: bool_of("error"),
            theme: string_of("theme"),
            error_message: string_of("error_message"),
            details,
        }
    }
}

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            Level::TRACE => LogLevel::Trace,
        }
    }
}

impl LogLevel {
    /// Get the display string for this log level
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Severity rank, higher is more severe
    pub fn severity(&self) -> u8 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 1,
            LogLevel::Info => 2,
            LogLevel::Warn => 3,
            LogLevel::Error => 4,
        }
    }

    /// Parse a level name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Query over captured entries; unset criteria match everything
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Keep entries at this severity or above
    pub min_level: Option<LogLevel>,
    /// Exact tracing target, e.g. [`THEME_TARGET`]
    pub target: Option<String>,
    /// Substring of the recorded `source` field
    pub source: Option<String>,
    /// Case-insensitive text in the message, source or target
    pub search: Option<String>,
    /// Maximum number of entries returned (0 means no limit)
    pub limit: Option<usize>,
}

impl LogFilter {
    /// Only theme events
    pub fn theme_events() -> Self {
        Self {
            target: Some(THEME_TARGET.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(min) = self.min_level {
            if entry.level.severity() < min.severity() {
                return false;
            }
        }
        if let Some(target) = &self.target {
            if entry.target != *target {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if !entry.source().is_some_and(|s| s.contains(source.as_str())) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = entry.message.to_lowercase().contains(&needle)
                || entry.target.to_lowercase().contains(&needle)
                || entry
                    .source()
                    .is_some_and(|s| s.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// In-memory log buffer with bounded size (ring buffer)
#[derive(Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    // A panic while holding the lock leaves the queue itself intact
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a log entry to the buffer
    /// If the buffer is full, removes the oldest entry
    pub fn add(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= MAX_LOG_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Get all log entries (most recent last)
    pub fn get_all(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Entries matching `filter`, most recent first
    pub fn filtered(&self, filter: &LogFilter) -> Vec<LogEntry> {
        let entries = self.lock();
        let matching = entries.iter().rev().filter(|e| filter.matches(e)).cloned();
        match filter.limit {
            Some(limit) if limit > 0 => matching.take(limit).collect(),
            _ => matching.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracing layer that captures events (with their fields) into a buffer
pub struct CaptureLayer {
    buffer: LogBuffer,
    sender: Option<mpsc::Sender<LogEntry>>,
}

impl CaptureLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self {
            buffer,
            sender: None,
        }
    }

    /// Capture into `buffer` and also stream every entry over `sender`
    pub fn with_sender(buffer: LogBuffer, sender: mpsc::Sender<LogEntry>) -> Self {
        Self {
            buffer,
            sender: Some(sender),
        }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::from(metadata.level()),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        };

        self.buffer.add(entry.clone());

        if let Some(sender) = &self.sender {
            // Never block the emitting thread; a full channel drops the entry
            let _ = sender.try_send(entry);
        }
    }

    fn enabled(&self, _metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        // Filtering happens at subscriber level
        true
    }
}

/// Visitor that splits the message from the structured fields
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.insert(field, Value::String(value.to_string()));
        }
    }

    // `message` arrives as fmt::Arguments, whose Debug output is the text itself
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = text;
        } else {
            self.insert(field, Value::String(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            target: "test".to_string(),
            message: message.to_string(),
            fields: Map::new(),
        }
    }

    #[test]
    fn test_buffer_evicts_oldest() {
        let buffer = LogBuffer::new();
        for i in 0..MAX_LOG_ENTRIES + 5 {
            buffer.add(entry(&i.to_string()));
        }
        let all = buffer.get_all();
        assert_eq!(all.len(), MAX_LOG_ENTRIES);
        assert_eq!(all.first().unwrap().message, "5");
        assert_eq!(
            all.last().unwrap().message,
            (MAX_LOG_ENTRIES + 4).to_string()
        );
    }

    #[test]
    fn test_buffer_clones_share_entries() {
        let buffer = LogBuffer::new();
        let other = buffer.clone();
        buffer.add(entry("one"));
        assert_eq!(other.len(), 1);
        other.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_layer_captures_message_and_fields() {
        let buffer = LogBuffer::new();
        let subscriber = tracing_subscriber::registry().with(CaptureLayer::new(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "theme", attempts = 2u64, ok = false, "retrying theme load");
        });

        let all = buffer.get_all();
        assert_eq!(all.len(), 1);
        let captured = &all[0];
        assert_eq!(captured.level, LogLevel::Warn);
        assert_eq!(captured.target, "theme");
        assert_eq!(captured.message, "retrying theme load");
        assert_eq!(captured.fields["attempts"], Value::from(2u64));
        assert_eq!(captured.fields["ok"], Value::Bool(false));
        assert!(!captured.fields.contains_key("message"));
    }

    #[tokio::test]
    async fn test_layer_streams_to_channel() {
        let buffer = LogBuffer::new();
        let (tx, mut rx) = mpsc::channel(4);
        let subscriber =
            tracing_subscriber::registry().with(CaptureLayer::with_sender(buffer.clone(), tx));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("theme applied");
        });

        let streamed = rx.recv().await.unwrap();
        assert_eq!(streamed.message, "theme applied");
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_theme_details_from_fields() {
        let mut captured = entry("theme applied");
        captured
            .fields
            .insert("success".to_string(), Value::Bool(true));
        captured
            .fields
            .insert("theme".to_string(), Value::String("dark".to_string()));
        captured.fields.insert(
            "details".to_string(),
            Value::String(r#"{"cssVarsCount":42}"#.to_string()),
        );

        let details = captured.theme_details();
        assert_eq!(details.success, Some(true));
        assert_eq!(details.theme.as_deref(), Some("dark"));
        assert_eq!(details.error, None);
        assert_eq!(details.details.unwrap()["cssVarsCount"], Value::from(42));
    }

    fn theme_entry(level: LogLevel, source: &str, message: &str) -> LogEntry {
        let mut e = entry(message);
        e.level = level;
        e.target = THEME_TARGET.to_string();
        e.fields
            .insert("source".to_string(), Value::String(source.to_string()));
        e
    }

    fn sample_buffer() -> LogBuffer {
        let buffer = LogBuffer::new();
        buffer.add(theme_entry(LogLevel::Debug, "SiteThemeProvider", "Applying site theme"));
        buffer.add(entry("unrelated startup line"));
        buffer.add(theme_entry(LogLevel::Info, "ThemeStore", "Theme loaded"));
        buffer.add(theme_entry(LogLevel::Error, "SiteThemeProvider", "Failed to apply theme"));
        buffer
    }

    fn messages(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_filtered_default_is_newest_first() {
        let all = sample_buffer().filtered(&LogFilter::default());
        assert_eq!(
            messages(&all),
            vec![
                "Failed to apply theme",
                "Theme loaded",
                "unrelated startup line",
                "Applying site theme"
            ]
        );
    }

    #[test]
    fn test_filtered_by_target() {
        let themed = sample_buffer().filtered(&LogFilter::theme_events());
        assert_eq!(themed.len(), 3);
        assert!(themed.iter().all(|e| e.target == THEME_TARGET));
    }

    #[test]
    fn test_filtered_by_min_level() {
        let filter = LogFilter {
            min_level: Some(LogLevel::Info),
            ..LogFilter::default()
        };
        // the untargeted entry is INFO as well
        assert_eq!(
            messages(&sample_buffer().filtered(&filter)),
            vec!["Failed to apply theme", "Theme loaded", "unrelated startup line"]
        );

        let filter = LogFilter {
            min_level: Some(LogLevel::Error),
            ..LogFilter::default()
        };
        assert_eq!(
            messages(&sample_buffer().filtered(&filter)),
            vec!["Failed to apply theme"]
        );
    }

    #[test]
    fn test_filtered_by_source() {
        let filter = LogFilter {
            source: Some("SiteTheme".to_string()),
            ..LogFilter::default()
        };
        assert_eq!(
            messages(&sample_buffer().filtered(&filter)),
            vec!["Failed to apply theme", "Applying site theme"]
        );
    }

    #[test]
    fn test_filtered_by_search_is_case_insensitive() {
        let filter = LogFilter {
            search: Some("THEME LOADED".to_string()),
            ..LogFilter::default()
        };
        assert_eq!(
            messages(&sample_buffer().filtered(&filter)),
            vec!["Theme loaded"]
        );

        // source text is searched too
        let filter = LogFilter {
            search: Some("themestore".to_string()),
            ..LogFilter::default()
        };
        assert_eq!(sample_buffer().filtered(&filter).len(), 1);
    }

    #[test]
    fn test_filtered_limit() {
        let filter = LogFilter {
            limit: Some(2),
            ..LogFilter::theme_events()
        };
        assert_eq!(
            messages(&sample_buffer().filtered(&filter)),
            vec!["Failed to apply theme", "Theme loaded"]
        );

        let unlimited = LogFilter {
            limit: Some(0),
            ..LogFilter::default()
        };
        assert_eq!(sample_buffer().filtered(&unlimited).len(), 4);
    }

    #[test]
    fn test_entry_serializes_for_json_consumers() {
        let captured = theme_entry(LogLevel::Warn, "ThemeStore", "\"dark\" missing");
        let value = serde_json::to_value(&captured).unwrap();
        assert_eq!(value["level"], Value::String("WARN".to_string()));
        assert_eq!(value["target"], Value::String(THEME_TARGET.to_string()));
        assert_eq!(value["message"], Value::String("\"dark\" missing".to_string()));
        assert_eq!(value["fields"]["source"], Value::String("ThemeStore".to_string()));
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("nope"), None);
        assert_eq!(LogLevel::from(&Level::ERROR).as_str(), "ERROR");
    }
}
