// theme-log - structured log payloads for theme events
//
// The centre of the crate is ThemeLogDetails, the optional set of fields a
// theme-related log event carries (success/error flags, theme name, error
// message, free-form details). Around it:
// - conformance: checking loose JSON against the shape (strict or open)
// - sanitize: turning arbitrary values and errors into detail maps
// - logging: emitting details as tracing events and capturing them in memory
// - config / telemetry: settings and subscriber setup for the binary

pub mod cli;
pub mod config;
pub mod conformance;
pub mod details;
pub mod logging;
pub mod sanitize;
pub mod telemetry;

pub use conformance::{conforms, parse_details, parse_details_str, Conformance, ShapeError};
pub use details::{Outcome, ThemeLogDetails};
pub use logging::{CaptureLayer, LogBuffer, LogEntry, LogFilter, LogLevel, ThemeLogger};
pub use sanitize::{error_details, to_log_details};
