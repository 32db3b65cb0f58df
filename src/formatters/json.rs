//! JSON formatter for structured logging

use crate::core::{Formatter, LogLevel, Message, Result, TimestampFormat, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Serializes the whole message as one JSON object
///
/// Keys: `level`, `prefix`, `params`, `message`, `timestamp`. Compatible with
/// log aggregation tools that ingest JSON lines.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
    timestamp_format: TimestampFormat,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    level: LogLevel,
    prefix: &'a [String],
    params: &'a BTreeMap<String, Value>,
    message: &'a Value,
    timestamp: serde_json::Value,
}

impl JsonFormatter {
    /// Single-line output
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented, multi-line output
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Like `with_timestamp_format`, but rejects custom formats chrono cannot render
    pub fn try_with_timestamp_format(self, format: TimestampFormat) -> Result<Self> {
        format.validate()?;
        Ok(self.with_timestamp_format(format))
    }

    fn render(&self, message: &Message) -> serde_json::Result<String> {
        let record = JsonRecord {
            level: message.level,
            prefix: &message.prefix,
            params: &message.params,
            message: &message.message,
            timestamp: self.timestamp_format.to_json(&message.timestamp),
        };

        if self.pretty {
            serde_json::to_string_pretty(&record)
        } else {
            serde_json::to_string(&record)
        }
    }

    /// Safe representation used when the payload cannot be serialized
    fn fallback(&self, message: &Message, error: &serde_json::Error) -> String {
        let params: serde_json::Map<String, serde_json::Value> = message
            .params
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(format!("{:?}", v))))
            .collect();

        serde_json::json!({
            "level": message.level.to_str(),
            "prefix": &*message.prefix,
            "params": params,
            "message": format!("{:?}", message.message),
            "timestamp": self.timestamp_format.to_json(&message.timestamp),
            "serialization_error": error.to_string(),
        })
        .to_string()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, message: &Message) -> Result<String> {
        Ok(self
            .render(message)
            .unwrap_or_else(|e| self.fallback(message, &e)))
    }

    fn name(&self) -> &str {
        "json"
    }
}
