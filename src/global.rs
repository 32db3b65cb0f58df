//! Process-wide default dispatcher
//!
//! Created lazily on first use with every level enabled and no outputs, then
//! lives for the rest of the process. Libraries that want isolation should
//! hold their own [`Dispatcher`] instead.

use crate::core::{
    Dispatcher, Formatter, LevelSelection, LevelSet, Logger, LoggerError, Output, OutputEntry,
    Result,
};
use std::sync::{Arc, OnceLock};

static GLOBAL_DISPATCHER: OnceLock<Arc<Dispatcher>> = OnceLock::new();

/// Install a preconfigured dispatcher as the process-wide default.
///
/// Fails once the default exists, whether installed or created lazily.
pub fn install(dispatcher: Arc<Dispatcher>) -> Result<Arc<Dispatcher>> {
    GLOBAL_DISPATCHER
        .set(Arc::clone(&dispatcher))
        .map_err(|_| LoggerError::config("global", "default dispatcher already initialized"))?;
    Ok(dispatcher)
}

/// The process-wide default dispatcher, created on first call
pub fn dispatcher() -> Arc<Dispatcher> {
    Arc::clone(GLOBAL_DISPATCHER.get_or_init(Dispatcher::new))
}

pub fn set_level(selection: impl Into<LevelSelection>) {
    dispatcher().set_level(selection);
}

/// Parse and apply a level selection such as `"warn"` or `"error,debug"`
pub fn set_level_str(selection: &str) -> Result<()> {
    dispatcher().set_level_str(selection)
}

pub fn levels() -> LevelSet {
    dispatcher().levels()
}

pub fn add_output<F, O>(formatter: F, output: O)
where
    F: Formatter + 'static,
    O: Output + 'static,
{
    dispatcher().add_output(formatter, output);
}

pub fn set_outputs(entries: impl IntoIterator<Item = OutputEntry>) {
    dispatcher().set_outputs(entries);
}

/// Root logger on the default dispatcher
pub fn create_logger(prefix: Option<&str>) -> Logger {
    dispatcher().create_logger(prefix)
}
