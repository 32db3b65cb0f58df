//! Payload and parameter values
//!
//! `Value` is the closed set of value kinds a log call can carry:
//! primitives, timestamps, errors, sequences, sets, maps, records and an
//! opaque fallback for anything that is only representable by its `Debug`
//! text.

use super::timestamp::TimestampFormat;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::time::SystemTime;

/// Value carried as a log payload or as a context parameter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Only for unsigned values above `i64::MAX`
    UInt(u64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Error(ErrorValue),
    List(Vec<Value>),
    Set(Vec<Value>),
    /// Map with arbitrary keys, in insertion order
    Map(Vec<(Value, Value)>),
    /// String-keyed object
    Record(BTreeMap<String, Value>),
    /// Fallback kind: `Debug` rendering of a value with no better mapping
    Opaque(String),
}

/// Captured error: its message plus the chain of `source()` messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorValue {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Capture an error and walk its source chain
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            name: short_type_name(std::any::type_name::<E>()).to_string(),
            message: err.to_string(),
            causes,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)?;
        for cause in &self.causes {
            write!(f, "\n    caused by: {}", cause)?;
        }
        Ok(())
    }
}

// "std::io::error::Error" -> "Error", "dyn core::error::Error" -> "Error"
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl Value {
    /// Capture any error, including its source chain
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Value::Error(ErrorValue::from_error(err))
    }

    /// Fallback for values with no structured mapping
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Opaque(format!("{:?}", value))
    }

    /// Convert any `Serialize` value through its JSON data model.
    ///
    /// Serialization failures degrade to an opaque description instead of
    /// failing the log call.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => json.into(),
            Err(e) => Value::Opaque(format!("<unserializable: {}>", e)),
        }
    }

    /// Set of values; duplicates are kept out by value equality
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut values: Vec<Value> = Vec::new();
        for item in items {
            let item = item.into();
            if !values.contains(&item) {
                values.push(item);
            }
        }
        Value::Set(values)
    }

    /// Map with arbitrary key values, insertion-ordered
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert to `serde_json::Value`, using the same rules as serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::String(format!("{:?}", self)))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::String(s) | Value::Opaque(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => serializer.serialize_str(&TimestampFormat::Iso8601.format(ts)),
            Value::Error(err) => err.serialize(serializer),
            Value::List(items) | Value::Set(items) => serializer.collect_seq(items),
            Value::Map(entries) => {
                if entries.iter().all(|(k, _)| matches!(k, Value::String(_))) {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (key, value) in entries {
                        if let Value::String(key) = key {
                            map.serialize_entry(key, value)?;
                        }
                    }
                    map.end()
                } else {
                    serializer.collect_seq(entries.iter().map(|(k, v)| [k, v]))
                }
            }
            Value::Record(fields) => serializer.collect_map(fields),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    n.as_f64().map(Value::Float).unwrap_or(Value::Null)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::String(c.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i as i64)
            }
        })*
    };
}

// Same rule as JSON numbers: `UInt` only above `i64::MAX`
macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(u: $t) -> Self {
                let u = u as u64;
                i64::try_from(u).map(Value::Int).unwrap_or(Value::UInt(u))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<SystemTime> for Value {
    fn from(ts: SystemTime) -> Self {
        Value::Timestamp(ts.into())
    }
}

impl From<ErrorValue> for Value {
    fn from(err: ErrorValue) -> Self {
        Value::Error(err)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<HashSet<T>> for Value {
    fn from(items: HashSet<T>) -> Self {
        Value::Set(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(items: BTreeSet<T>) -> Self {
        Value::Set(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(fields: BTreeMap<String, V>) -> Self {
        Value::Record(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(fields: HashMap<String, V>) -> Self {
        Value::Record(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Collect `(key, value)` pairs into a record
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Record(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
