//! Async output trait for non-blocking delivery

use super::{error::Result, formatter::SharedFormatter, message::Message};
use async_trait::async_trait;

/// Trait for outputs whose delivery is asynchronous
///
/// Registered through [`SpawnOutput`](crate::outputs::SpawnOutput), which
/// starts one task per message and never waits for it.
///
/// # Example
///
/// ```no_run
/// use rust_log_facade::core::{AsyncOutput, Message, Result, SharedFormatter};
/// use async_trait::async_trait;
///
/// struct Webhook;
///
/// #[async_trait]
/// impl AsyncOutput for Webhook {
///     async fn emit(&self, message: Message, formatter: SharedFormatter) -> Result<()> {
///         let _line = formatter.format(&message)?;
///         // send `_line` somewhere
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "webhook"
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncOutput: Send + Sync + 'static {
    /// Format and deliver one message
    async fn emit(&self, message: Message, formatter: SharedFormatter) -> Result<()>;

    /// Get the output name
    fn name(&self) -> &str;
}
