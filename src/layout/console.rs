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

use serde::Serializer;
use serde::ser::SerializeMap;

use crate::Error;
use crate::layout::Layout;
use crate::layout::LayoutConfig;
use crate::record::Record;

/// A tab separated text layout.
///
/// Output format:
///
/// ```text
/// 2024-08-10T17:12:52.123+0800	info	billing	src/main.rs:12	charged	{"amount":42}
/// 2024-08-10T17:12:52.123+0800	warn	billing	src/main.rs:15	retrying
/// <stack trace>
/// ```
///
/// Entries whose key is empty in the [`LayoutConfig`] are skipped, as are absent values such as a
/// missing logger name.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLayout {
    config: LayoutConfig,
}

impl ConsoleLayout {
    /// Create a console layout with the given schema.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }
}

impl Layout for ConsoleLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let config = &self.config;
        let mut parts: Vec<String> = Vec::with_capacity(6);

        if !config.time_key.is_empty() {
            parts.push(config.format_time(record.time()));
        }
        if !config.level_key.is_empty() {
            parts.push(record.level().as_str().to_string());
        }
        if !config.name_key.is_empty() {
            if let Some(name) = record.name() {
                parts.push(name.to_string());
            }
        }
        if !config.caller_key.is_empty() {
            if let Some(caller) = config.format_caller(record) {
                parts.push(caller);
            }
        }
        if !config.message_key.is_empty() {
            parts.push(record.message().to_string());
        }
        if record.has_fields() {
            parts.push(format_fields(record)?);
        }

        let mut text = parts.join("\t");
        if !config.stacktrace_key.is_empty() {
            if let Some(stacktrace) = record.stacktrace() {
                text.push('\n');
                text.push_str(stacktrace);
            }
        }
        text.push_str(config.line_ending);

        Ok(text.into_bytes())
    }
}

fn format_fields(record: &Record) -> Result<String, Error> {
    let mut bytes = Vec::new();
    let mut serializer = serde_json::Serializer::new(&mut bytes);
    let mut map = serializer
        .serialize_map(None)
        .map_err(|err| Error::new("failed to encode fields").with_source(err))?;
    for field in record.fields() {
        map.serialize_entry(field.key(), field.value())
            .map_err(|err| {
                Error::new("failed to encode field")
                    .with_context("key", field.key())
                    .with_source(err)
            })?;
    }
    map.end()
        .map_err(|err| Error::new("failed to encode fields").with_source(err))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
