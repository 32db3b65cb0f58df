//! Logging macros with `format!`-style arguments.
//!
//! The level is checked before the arguments are formatted, so a disabled
//! level costs one atomic load.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::info;
//!
//! let logger = Dispatcher::new().create_logger(Some("server"));
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Dispatcher::new().create_logger(None);
/// use rust_log_facade::emit;
/// emit!(logger, LogLevel::Info, "Simple message");
/// emit!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! emit {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.emit(level, ::std::format!($($arg)+));
        }
    }};
}

/// Log an error-level message.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Dispatcher::new().create_logger(None);
/// use rust_log_facade::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log a message at the general `Log` level.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Dispatcher::new().create_logger(None);
/// use rust_log_facade::log;
/// log!(logger, "Processed {} items", 100);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::LogLevel::Log, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Dispatcher, LogLevel, Message, Result, SharedFormatter};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn capture() -> (Arc<Dispatcher>, Arc<Mutex<Vec<(LogLevel, String)>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let dispatcher = Dispatcher::builder()
            .output(
                |m: &Message| m.message.as_str().unwrap_or_default().to_string(),
                move |m: &Message, f: &SharedFormatter| -> Result<()> {
                    sink.lock().push((m.level, f.format(m)?));
                    Ok(())
                },
            )
            .build();
        (dispatcher, lines)
    }

    #[test]
    fn test_level_macros() {
        let (dispatcher, lines) = capture();
        let logger = dispatcher.create_logger(None);

        error!(logger, "code {}", 500);
        warn!(logger, "retry {} of {}", 1, 3);
        log!(logger, "plain");
        info!(logger, "items: {}", 100);
        debug!(logger, "count: {}", 5);
        emit!(logger, LogLevel::Info, "explicit");

        let lines = lines.lock();
        assert_eq!(
            *lines,
            vec![
                (LogLevel::Error, "code 500".to_string()),
                (LogLevel::Warn, "retry 1 of 3".to_string()),
                (LogLevel::Log, "plain".to_string()),
                (LogLevel::Info, "items: 100".to_string()),
                (LogLevel::Debug, "count: 5".to_string()),
                (LogLevel::Info, "explicit".to_string()),
            ]
        );
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        struct Counted<'a>(&'a AtomicUsize);

        impl std::fmt::Display for Counted<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fetch_add(1, Ordering::SeqCst);
                write!(f, "counted")
            }
        }

        let (dispatcher, lines) = capture();
        dispatcher.set_level(LogLevel::Warn);
        let logger = dispatcher.create_logger(None);
        let calls = AtomicUsize::new(0);

        debug!(logger, "{}", Counted(&calls));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(lines.lock().is_empty());

        error!(logger, "{}", Counted(&calls));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lines.lock().len(), 1);
    }
}
