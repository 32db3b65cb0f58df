//! Core facade types: levels, values, messages, contexts and dispatch

pub mod async_output;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod level_gate;
pub mod log_level;
pub mod logger;
pub mod message;
pub mod metrics;
pub mod output;
pub mod registry;
pub mod timestamp;
pub mod value;

pub use async_output::AsyncOutput;
pub use dispatcher::{
    Dispatcher, DispatcherBuilder, SinkFailure, SinkFailureCallback, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use error::{LoggerError, Result};
pub use formatter::{Formatter, SharedFormatter};
pub use level_gate::LevelGate;
pub use log_level::{LevelSelection, LevelSet, LogLevel};
pub use logger::Logger;
pub use message::{Message, Params, Prefix};
pub use metrics::LoggerMetrics;
pub use output::{Output, SharedOutput};
pub use registry::{OutputEntry, OutputRegistry};
pub use timestamp::TimestampFormat;
pub use value::{ErrorValue, Value};
