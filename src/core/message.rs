//! Message: the immutable unit passed to every formatter/output pair

use super::log_level::LogLevel;
use super::value::Value;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Hierarchical namespace segments, shared between contexts
pub type Prefix = Arc<[String]>;

/// Contextual key/value metadata, shared between contexts
pub type Params = Arc<BTreeMap<String, Value>>;

/// A single log event.
///
/// Built once per enabled log call and handed by reference to every
/// registered pair, so all outputs observe the same timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub level: LogLevel,
    pub prefix: Prefix,
    pub params: Params,
    pub message: Value,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        level: LogLevel,
        prefix: Prefix,
        params: Params,
        message: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            level,
            prefix,
            params,
            message,
            timestamp,
        }
    }

    /// Stand-alone message with no context, stamped now
    pub fn now(level: LogLevel, message: impl Into<Value>) -> Self {
        Self::new(
            level,
            Arc::from(Vec::new()),
            Arc::new(BTreeMap::new()),
            message.into(),
            Utc::now(),
        )
    }

    /// Prefix segments joined with `.`
    pub fn prefix_path(&self) -> String {
        self.prefix.join(".")
    }
}
