//! Immutable logger context: prefix chain plus key/value params
//!
//! Every builder call returns a new `Logger`; the receiver is never mutated,
//! so one long-lived handle can be derived from concurrently by unrelated
//! call sites.

use super::{
    dispatcher::Dispatcher,
    log_level::LogLevel,
    message::{Params, Prefix},
    value::Value,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    dispatcher: Arc<Dispatcher>,
    prefix: Prefix,
    params: Params,
}

impl Logger {
    pub(crate) fn from_parts(dispatcher: Arc<Dispatcher>, prefix: Prefix, params: Params) -> Self {
        Self {
            dispatcher,
            prefix,
            params,
        }
    }

    /// Child context with `segment` appended to the prefix
    #[must_use]
    pub fn prefix(&self, segment: impl Into<String>) -> Logger {
        let mut segments = Vec::with_capacity(self.prefix.len() + 1);
        segments.extend(self.prefix.iter().cloned());
        segments.push(segment.into());

        Logger {
            dispatcher: Arc::clone(&self.dispatcher),
            prefix: Arc::from(segments),
            params: Arc::clone(&self.params),
        }
    }

    /// Child context with one parameter added or overwritten
    #[must_use]
    pub fn param(&self, key: impl Into<String>, value: impl Into<Value>) -> Logger {
        let mut params = BTreeMap::clone(&self.params);
        params.insert(key.into(), value.into());
        self.with_params(params)
    }

    /// Child context with several parameters overlaid on the current ones
    #[must_use]
    pub fn params<I, K, V>(&self, entries: I) -> Logger
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = BTreeMap::clone(&self.params);
        params.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.with_params(params)
    }

    fn with_params(&self, params: BTreeMap<String, Value>) -> Logger {
        Logger {
            dispatcher: Arc::clone(&self.dispatcher),
            prefix: Arc::clone(&self.prefix),
            params: Arc::new(params),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.prefix
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.dispatcher.is_enabled(level)
    }

    /// Emit `payload` at `level`.
    ///
    /// A disabled level returns before the payload is even converted. Output
    /// failures are contained by the dispatcher and never reach the caller.
    pub fn emit(&self, level: LogLevel, payload: impl Into<Value>) {
        if !self.dispatcher.is_enabled(level) {
            return;
        }
        self.dispatcher
            .dispatch(level, &self.prefix, &self.params, payload.into());
    }

    #[inline]
    pub fn error(&self, payload: impl Into<Value>) {
        self.emit(LogLevel::Error, payload);
    }

    #[inline]
    pub fn warn(&self, payload: impl Into<Value>) {
        self.emit(LogLevel::Warn, payload);
    }

    #[inline]
    pub fn log(&self, payload: impl Into<Value>) {
        self.emit(LogLevel::Log, payload);
    }

    #[inline]
    pub fn info(&self, payload: impl Into<Value>) {
        self.emit(LogLevel::Info, payload);
    }

    #[inline]
    pub fn debug(&self, payload: impl Into<Value>) {
        self.emit(LogLevel::Debug, payload);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("prefix", &self.prefix)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
