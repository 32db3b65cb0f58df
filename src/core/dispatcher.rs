//! Dispatch engine: level gate, output registry and fan-out

use super::{
    error::Result,
    formatter::Formatter,
    level_gate::LevelGate,
    log_level::{LevelSelection, LevelSet, LogLevel},
    logger::Logger,
    message::{Message, Params, Prefix},
    metrics::LoggerMetrics,
    output::Output,
    registry::{OutputEntry, OutputRegistry},
    value::Value,
};
use chrono::{DateTime, TimeZone, Utc};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default shutdown timeout for outputs that drain a queue on drop (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure of a single output invocation, as seen by the failure hook
#[derive(Debug, Clone)]
pub struct SinkFailure {
    /// Position of the entry in the registry snapshot
    pub index: usize,
    pub output: String,
    pub level: LogLevel,
    pub reason: String,
    pub panicked: bool,
}

/// Callback invoked for every contained sink failure
pub type SinkFailureCallback = Arc<dyn Fn(&SinkFailure) + Send + Sync>;

/// Process-scoped logging configuration and fan-out engine.
///
/// Owns the enabled-level set and the output registry. Loggers hold an
/// `Arc<Dispatcher>`, so independent dispatchers never share state.
///
/// # Example
///
/// ```
/// use rust_log_facade::prelude::*;
///
/// let dispatcher = Dispatcher::new();
/// dispatcher.set_level(LogLevel::Info);
/// dispatcher.add_output(JsonFormatter::new(), ConsoleOutput::new());
///
/// let logger = dispatcher.create_logger(Some("server"));
/// logger.param("port", 8080).info("listening");
/// ```
pub struct Dispatcher {
    gate: LevelGate,
    registry: OutputRegistry,
    metrics: LoggerMetrics,
    on_sink_failure: Option<SinkFailureCallback>,
    /// Last issued timestamp in microseconds, keeps timestamps non-decreasing
    last_timestamp: AtomicI64,
}

impl Dispatcher {
    /// Dispatcher with every level enabled and no outputs
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::unshared())
    }

    pub(crate) fn unshared() -> Self {
        Self {
            gate: LevelGate::new(),
            registry: OutputRegistry::new(),
            metrics: LoggerMetrics::new(),
            on_sink_failure: None,
            last_timestamp: AtomicI64::new(i64::MIN),
        }
    }

    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Replace the enabled-level set.
    ///
    /// A single level enables it and every more severe level; a list enables
    /// exactly its members.
    pub fn set_level(&self, selection: impl Into<LevelSelection>) {
        self.gate.set(selection);
    }

    /// Parse and apply a level selection such as `"warn"` or `"error,debug"`.
    ///
    /// Unrecognized names are rejected and leave the current set untouched.
    pub fn set_level_str(&self, selection: &str) -> Result<()> {
        let selection: LevelSelection = selection.parse()?;
        self.gate.set(selection);
        Ok(())
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.gate.is_enabled(level)
    }

    pub fn levels(&self) -> LevelSet {
        self.gate.levels()
    }

    /// Register a formatter/output pair. No limit and no deduplication.
    pub fn add_output<F, O>(&self, formatter: F, output: O)
    where
        F: Formatter + 'static,
        O: Output + 'static,
    {
        self.registry.push(OutputEntry::new(formatter, output));
    }

    pub fn add_entry(&self, entry: OutputEntry) {
        self.registry.push(entry);
    }

    /// Replace every registered pair
    pub fn set_outputs(&self, entries: impl IntoIterator<Item = OutputEntry>) {
        self.registry.replace(entries.into_iter().collect());
    }

    pub fn output_count(&self) -> usize {
        self.registry.len()
    }

    /// Root logger with a single-segment prefix, or an empty prefix
    pub fn create_logger(self: &Arc<Self>, prefix: Option<&str>) -> Logger {
        let segments: Vec<String> = prefix.map(str::to_string).into_iter().collect();
        Logger::from_parts(
            Arc::clone(self),
            Arc::from(segments),
            Arc::new(BTreeMap::new()),
        )
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every registered output, stopping at the first error
    pub fn flush(&self) -> Result<()> {
        for entry in self.registry.snapshot().iter() {
            entry.output.flush()?;
        }
        Ok(())
    }

    /// Gate, build the message, fan it out. Never fails.
    pub(crate) fn dispatch(&self, level: LogLevel, prefix: &Prefix, params: &Params, payload: Value) {
        if !self.gate.is_enabled(level) {
            return;
        }

        let message = Message::new(
            level,
            Arc::clone(prefix),
            Arc::clone(params),
            payload,
            self.next_timestamp(),
        );
        self.fan_out(&message);
    }

    /// Deliver an already built message to every registered pair.
    ///
    /// Each output runs in isolation: an error or a panic in one output is
    /// counted and reported, and the remaining outputs still receive the
    /// message.
    ///
    /// The unwind is caught but the process panic hook still runs first, so
    /// a panicking output also prints the usual `thread '..' panicked` line
    /// to stderr. Install a hook with `std::panic::set_hook` to silence it.
    pub fn fan_out(&self, message: &Message) {
        self.metrics.record_dispatched();

        let entries = self.registry.snapshot();
        for (idx, entry) in entries.iter().enumerate() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                entry.output.emit(message, &entry.formatter)
            }));

            match result {
                Ok(Ok(())) => {
                    self.metrics.record_delivered();
                }
                Ok(Err(e)) => {
                    let previous = self.metrics.record_failure();
                    self.report(
                        SinkFailure {
                            index: idx,
                            output: entry.output.name().to_string(),
                            level: message.level,
                            reason: e.to_string(),
                            panicked: false,
                        },
                        previous,
                    );
                }
                Err(panic_info) => {
                    let previous = self.metrics.record_panic();
                    self.report(
                        SinkFailure {
                            index: idx,
                            output: entry.output.name().to_string(),
                            level: message.level,
                            reason: panic_message(panic_info.as_ref()),
                            panicked: true,
                        },
                        previous,
                    );
                }
            }
        }
    }

    fn report(&self, failure: SinkFailure, previous: u64) {
        if let Some(ref callback) = self.on_sink_failure {
            // A panicking hook is swallowed as well
            let _ = panic::catch_unwind(AssertUnwindSafe(|| callback(&failure)));
            return;
        }

        // Alert on first failure and periodically thereafter
        if previous == 0 || (previous + 1) % 1000 == 0 {
            let tag = if failure.panicked {
                "LOGGER CRITICAL"
            } else {
                "LOGGER ERROR"
            };
            eprintln!(
                "[{}] Output #{} ({}) failed: {}. Other outputs continue to function.",
                tag, failure.index, failure.output, failure.reason
            );
        }
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let previous = self.last_timestamp.fetch_max(now, Ordering::AcqRel);
        let micros = now.max(previous);

        let secs = micros.div_euclid(1_000_000);
        let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
        Utc.timestamp_opt(secs, nanos).single().unwrap_or_else(Utc::now)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::unshared()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("levels", &self.levels().to_string())
            .field("outputs", &self.registry.len())
            .field("metrics", &self.metrics)
            .finish()
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing a [`Dispatcher`] with a fluent API
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
/// use std::sync::Arc;
///
/// let dispatcher = Dispatcher::builder()
///     .level(LogLevel::Warn)
///     .output(PrettyFormatter::new(PrettyOptions::plain()), ConsoleOutput::new())
///     .on_sink_failure(Arc::new(|failure: &SinkFailure| {
///         eprintln!("ALERT: output {} failed: {}", failure.output, failure.reason);
///     }))
///     .build();
///
/// assert_eq!(dispatcher.output_count(), 1);
/// ```
pub struct DispatcherBuilder {
    levels: LevelSelection,
    entries: Vec<OutputEntry>,
    on_sink_failure: Option<SinkFailureCallback>,
}

impl DispatcherBuilder {
    /// Create a new builder with every level enabled and no outputs
    pub fn new() -> Self {
        Self {
            levels: LevelSelection::Exact(LevelSet::all()),
            entries: Vec::new(),
            on_sink_failure: None,
        }
    }

    /// Set the enabled levels
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, selection: impl Into<LevelSelection>) -> Self {
        self.levels = selection.into();
        self
    }

    /// Add a formatter/output pair
    #[must_use = "builder methods return a new value"]
    pub fn output<F, O>(mut self, formatter: F, output: O) -> Self
    where
        F: Formatter + 'static,
        O: Output + 'static,
    {
        self.entries.push(OutputEntry::new(formatter, output));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn entry(mut self, entry: OutputEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Set a callback for contained sink failures
    ///
    /// Without a callback, failures are reported on stderr on the first
    /// occurrence and every 1000th one after that. Either way a panicking
    /// output is also printed by the process panic hook, which this callback
    /// does not replace.
    #[must_use = "builder methods return a new value"]
    pub fn on_sink_failure(mut self, callback: SinkFailureCallback) -> Self {
        self.on_sink_failure = Some(callback);
        self
    }

    /// Build the Dispatcher
    pub fn build(self) -> Arc<Dispatcher> {
        let mut dispatcher = Dispatcher::unshared();
        dispatcher.gate.set(self.levels);
        dispatcher.registry.replace(self.entries);
        dispatcher.on_sink_failure = self.on_sink_failure;
        Arc::new(dispatcher)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoggerError, SharedFormatter};
    use parking_lot::Mutex;

    type Captured = Arc<Mutex<Vec<Message>>>;

    fn capture(dispatcher: &Dispatcher) -> Captured {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        dispatcher.add_output(
            |m: &Message| m.level.to_string(),
            move |m: &Message, _: &SharedFormatter| -> Result<()> {
                sink.lock().push(m.clone());
                Ok(())
            },
        );
        captured
    }

    #[test]
    fn test_builder_defaults() {
        let dispatcher = Dispatcher::builder().build();
        assert_eq!(dispatcher.levels(), LevelSet::all());
        assert_eq!(dispatcher.output_count(), 0);
    }

    #[test]
    fn test_builder_level_and_outputs() {
        let dispatcher = Dispatcher::builder()
            .level(LogLevel::Warn)
            .output(
                |m: &Message| m.prefix_path(),
                |_: &Message, _: &SharedFormatter| -> Result<()> { Ok(()) },
            )
            .build();

        assert!(dispatcher.is_enabled(LogLevel::Error));
        assert!(!dispatcher.is_enabled(LogLevel::Log));
        assert_eq!(dispatcher.output_count(), 1);
    }

    #[test]
    fn test_set_level_str_rejects_unknown() {
        let dispatcher = Dispatcher::new();
        dispatcher.set_level(LogLevel::Info);

        let err = dispatcher.set_level_str("loud").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel { .. }));
        assert_eq!(dispatcher.levels(), LevelSet::at_least(LogLevel::Info));

        dispatcher.set_level_str("error,debug").unwrap();
        assert!(dispatcher.is_enabled(LogLevel::Debug));
        assert!(!dispatcher.is_enabled(LogLevel::Info));
    }

    #[test]
    fn test_disabled_level_builds_nothing() {
        let dispatcher = Dispatcher::new();
        let captured = capture(&dispatcher);
        dispatcher.set_level(LogLevel::Warn);

        let logger = dispatcher.create_logger(None);
        logger.debug("x");
        logger.log("y");

        assert!(captured.lock().is_empty());
        assert_eq!(dispatcher.metrics().dispatched(), 0);
    }

    #[test]
    fn test_failure_hook_receives_errors_and_panics() {
        let failures: Arc<Mutex<Vec<SinkFailure>>> = Arc::new(Mutex::new(Vec::new()));
        let hook_failures = Arc::clone(&failures);

        let dispatcher = Dispatcher::builder()
            .output(
                |m: &Message| m.level.to_string(),
                |_: &Message, _: &SharedFormatter| -> Result<()> {
                    Err(LoggerError::other("sink offline"))
                },
            )
            .output(
                |m: &Message| m.level.to_string(),
                |_: &Message, _: &SharedFormatter| -> Result<()> { panic!("sink exploded") },
            )
            .on_sink_failure(Arc::new(move |failure: &SinkFailure| {
                hook_failures.lock().push(failure.clone());
            }))
            .build();
        let captured = capture(&dispatcher);

        dispatcher.create_logger(None).error("boom");

        let failures = failures.lock();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 0);
        assert!(!failures[0].panicked);
        assert!(failures[0].reason.contains("sink offline"));
        assert_eq!(failures[1].index, 1);
        assert!(failures[1].panicked);
        assert_eq!(failures[1].reason, "sink exploded");

        assert_eq!(captured.lock().len(), 1);
        assert_eq!(dispatcher.metrics().sink_failures(), 1);
        assert_eq!(dispatcher.metrics().sink_panics(), 1);
        assert_eq!(dispatcher.metrics().delivered(), 1);
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let dispatcher = Dispatcher::new();
        let captured = capture(&dispatcher);
        let logger = dispatcher.create_logger(None);

        for i in 0..100 {
            logger.info(i);
        }

        let messages = captured.lock();
        assert_eq!(messages.len(), 100);
        for pair in messages.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn test_output_registering_during_fan_out_not_invoked() {
        let dispatcher = Dispatcher::new();
        let inner = Arc::clone(&dispatcher);
        let calls = Arc::new(Mutex::new(0usize));
        let calls_in_output = Arc::clone(&calls);

        dispatcher.add_output(
            |m: &Message| m.level.to_string(),
            move |_: &Message, _: &SharedFormatter| -> Result<()> {
                *calls_in_output.lock() += 1;
                inner.add_output(
                    |m: &Message| m.level.to_string(),
                    |_: &Message, _: &SharedFormatter| -> Result<()> { Ok(()) },
                );
                Ok(())
            },
        );

        dispatcher.create_logger(None).info("first");
        assert_eq!(*calls.lock(), 1);
        assert_eq!(dispatcher.output_count(), 2);
        assert_eq!(dispatcher.metrics().delivered(), 1);
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "Unknown panic");
    }
}
