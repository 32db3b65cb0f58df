//! Output trait for log delivery destinations

use super::{error::Result, formatter::SharedFormatter, message::Message};
use std::sync::Arc;

/// Delivers a message to a sink.
///
/// An output is responsible for invoking the formatter it was registered with
/// and delivering the result. Outputs are only invoked for enabled levels.
pub trait Output: Send + Sync {
    fn emit(&self, message: &Message, formatter: &SharedFormatter) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "output"
    }
}

pub type SharedOutput = Arc<dyn Output>;

impl<F> Output for F
where
    F: Fn(&Message, &SharedFormatter) -> Result<()> + Send + Sync,
{
    fn emit(&self, message: &Message, formatter: &SharedFormatter) -> Result<()> {
        self(message, formatter)
    }

    fn name(&self) -> &str {
        "fn"
    }
}
