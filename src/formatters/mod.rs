//! Formatter implementations

pub mod json;
pub mod pretty;

pub use json::JsonFormatter;
pub use pretty::{ColorChoice, Palette, PrettyFormatter, PrettyOptions};

pub use crate::core::Formatter;

/// JSON formatter with default settings
pub fn json() -> JsonFormatter {
    JsonFormatter::new()
}

/// Pretty formatter with the given options
pub fn pretty(options: PrettyOptions) -> PrettyFormatter {
    PrettyFormatter::new(options)
}
