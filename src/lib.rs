//! # Rust Log Facade
//!
//! A minimal structured-logging facade: a level gate, immutable logger
//! contexts carrying a prefix chain and key/value params, and a dispatcher
//! that fans every message out to registered (formatter, output) pairs.
//!
//! ## Features
//!
//! - **Cheap when disabled**: a disabled level costs one atomic load
//! - **Immutable contexts**: `prefix` and `param` return new loggers, safe to share across threads
//! - **Pluggable**: any `Formatter` composes with any `Output`, closures included
//! - **Contained failures**: a failing or panicking output never reaches the caller
//!
//! ## Example
//!
//! ```
//! use rust_log_facade::prelude::*;
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.set_level(LogLevel::Info);
//! dispatcher.add_output(PrettyFormatter::default(), ConsoleOutput::new());
//!
//! let http = dispatcher.create_logger(Some("server")).prefix("http");
//! http.param("port", 8080).info("listening");
//! http.debug("filtered out");
//! ```

pub mod core;
pub mod formatters;
pub mod global;
pub mod macros;
pub mod outputs;

pub mod prelude {
    pub use crate::core::{
        Dispatcher, DispatcherBuilder, ErrorValue, Formatter, LevelSelection, LevelSet, LogLevel,
        Logger, LoggerError, LoggerMetrics, Message, Output, OutputEntry, Result, SharedFormatter,
        SharedOutput, SinkFailure, TimestampFormat, Value, AsyncOutput,
    };
    pub use crate::formatters::{ColorChoice, JsonFormatter, Palette, PrettyFormatter, PrettyOptions};
    pub use crate::outputs::{BackgroundOutput, ConsoleOutput};

    #[cfg(feature = "async-outputs")]
    pub use crate::outputs::SpawnOutput;
}

pub use crate::core::{
    AsyncOutput, Dispatcher, DispatcherBuilder, ErrorValue, Formatter, LevelSelection, LevelSet,
    LogLevel, Logger, LoggerError, LoggerMetrics, Message, Output, OutputEntry, Result,
    SharedFormatter, SharedOutput, SinkFailure, SinkFailureCallback, TimestampFormat, Value,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use formatters::{JsonFormatter, PrettyFormatter, PrettyOptions};
pub use outputs::{BackgroundOutput, ConsoleOutput};

#[cfg(feature = "async-outputs")]
pub use outputs::SpawnOutput;
