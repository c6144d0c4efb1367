//! Log line formatters (plain text and JSON).
//!
//! A formatter is a pure function of the event and the settings it was built
//! with. It holds no mutable state, so one instance is shared by every thread
//! that logs.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::config::{FormatterConfig, OutputFormat};
use crate::event::ProtocolEvent;

/// Trait for log formatters.
pub trait Formatter: Send + Sync {
    /// Format a protocol event as a single line.
    fn format(&self, event: &ProtocolEvent) -> String;
}

/// Create a formatter based on configuration.
pub fn create_formatter(config: &FormatterConfig) -> Box<dyn Formatter> {
    match config.format {
        OutputFormat::Plain => Box::new(TextFormatter::new(config)),
        OutputFormat::Json => Box::new(JsonFormatter::new(config)),
    }
}
