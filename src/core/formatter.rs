//! Formatter trait: renders a message to a string

use super::{error::Result, message::Message};
use std::sync::Arc;

/// Renders a [`Message`] into the string an output delivers.
///
/// Formatters should be pure functions of their input. They are expected to
/// degrade gracefully on payloads they cannot represent instead of failing.
pub trait Formatter: Send + Sync {
    fn format(&self, message: &Message) -> Result<String>;

    fn name(&self) -> &str {
        "formatter"
    }
}

/// Formatter shared between the registry and outputs that defer formatting
pub type SharedFormatter = Arc<dyn Formatter>;

impl<F> Formatter for F
where
    F: Fn(&Message) -> String + Send + Sync,
{
    fn format(&self, message: &Message) -> Result<String> {
        Ok(self(message))
    }

    fn name(&self) -> &str {
        "fn"
    }
}
