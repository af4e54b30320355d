// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured key-value fields attached to log records.
//!
//! The typed constructors ([`string`], [`int`], [`duration`], ...) keep the value's type known
//! at compile time. [`with`] encodes anything that implements [`Serialize`] on a best-effort
//! basis, while [`render`] and [`with_struct`] produce a human-readable debug dump that is
//! always a plain string.
//!
//! # Examples
//!
//! ```
//! use proof::field;
//!
//! #[derive(serde::Serialize)]
//! struct Order {
//!     id: u64,
//!     items: Vec<&'static str>,
//! }
//!
//! let fields = [
//!     field::string("user_id", "123"),
//!     field::with("order", &Order { id: 7, items: vec!["book"] }),
//!     field::with_error(&std::io::Error::other("disk full")),
//! ];
//! assert_eq!(fields[1].value().to_string(), r#"{"id":7,"items":["book"]}"#);
//! ```

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::Serializer;

/// A single typed key/value annotation attached to a log record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: Cow<'static, str>,
    value: Value,
}

impl Field {
    /// Create a field from a key and a value.
    pub fn new(key: impl Into<Cow<'static, str>>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// The field key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The field value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// The closed set of field values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string.
    String(String),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A floating point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A duration, encoded as fractional seconds.
    Duration(Duration),
    /// The display chain of an error.
    Error(String),
    /// A nested structured value.
    Json(serde_json::Value),
    /// A best-effort debug dump; not meant to be parsed.
    Debug(String),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) | Value::Error(s) | Value::Debug(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Uint(n) => serializer.serialize_u64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Duration(d) => serializer.serialize_f64(d.as_secs_f64()),
            Value::Json(v) => v.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Error(s) | Value::Debug(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Uint(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Duration(d) => write!(f, "{}", d.as_secs_f64()),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

/// A string field.
pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Field {
    Field::new(key, Value::String(value.into()))
}

/// A signed integer field.
pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Field {
    Field::new(key, Value::Int(value))
}

/// An unsigned integer field.
pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Field {
    Field::new(key, Value::Uint(value))
}

/// A floating point field.
pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Field {
    Field::new(key, Value::Float(value))
}

/// A boolean field.
pub fn boolean(key: impl Into<Cow<'static, str>>, value: bool) -> Field {
    Field::new(key, Value::Bool(value))
}

/// A duration field, encoded in seconds.
pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Field {
    Field::new(key, Value::Duration(value))
}

/// A nested structured field.
pub fn json(key: impl Into<Cow<'static, str>>, value: serde_json::Value) -> Field {
    Field::new(key, Value::Json(value))
}

/// Wrap any serializable value; its runtime shape decides the encoded form.
///
/// Strings stay strings, numbers stay numbers and composites become nested objects or arrays.
/// If the value refuses to serialize, the field carries the serialization error instead.
pub fn with<T>(key: impl Into<Cow<'static, str>>, value: &T) -> Field
where
    T: Serialize + ?Sized,
{
    let value = match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Value::String(s),
        Ok(serde_json::Value::Bool(b)) => Value::Bool(b),
        Ok(serde_json::Value::Number(n)) => {
            if let Some(n) = n.as_i64() {
                Value::Int(n)
            } else if let Some(n) = n.as_u64() {
                Value::Uint(n)
            } else {
                Value::Json(serde_json::Value::Number(n))
            }
        }
        Ok(v) => Value::Json(v),
        Err(err) => Value::Error(err.to_string()),
    };
    Field::new(key, value)
}

/// Wrap raw bytes as a string field.
///
/// Invalid UTF-8 sequences are replaced with `U+FFFD`.
pub fn with_byte_string(key: impl Into<Cow<'static, str>>, value: &[u8]) -> Field {
    Field::new(key, Value::String(String::from_utf8_lossy(value).into_owned()))
}

/// Wrap an error under the `error` key.
///
/// The value is the error message followed by its chain of sources.
pub fn with_error<E>(err: &E) -> Field
where
    E: std::error::Error + ?Sized,
{
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    Field::new("error", Value::Error(message))
}

/// Render a value into a deep, human-readable dump.
///
/// Unlike [`with`], the result is a plain string for diagnostics and carries no structure.
pub fn render<T>(key: impl Into<Cow<'static, str>>, value: &T) -> Field
where
    T: fmt::Debug + ?Sized,
{
    Field::new(key, Value::Debug(format!("{value:#?}")))
}

/// [`render`] a value keyed by its type name.
pub fn with_struct<T>(value: &T) -> Field
where
    T: fmt::Debug + ?Sized,
{
    render(short_type_name::<T>(), value)
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let name = type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    match base.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}
