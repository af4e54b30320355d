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

/// A JSON layout, one object per line.
///
/// Output format:
///
/// ```json
/// {"level":"info","time":"2024-08-10T17:12:52.123+0800","file":"src/main.rs:12","msg":"charged","amount":42}
/// ```
///
/// Fields are flattened into the top-level object after the message, in the order they were
/// attached.
#[derive(Debug, Clone, Default)]
pub struct JsonLayout {
    config: LayoutConfig,
}

impl JsonLayout {
    /// Create a JSON layout with the given schema.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }
}

impl Layout for JsonLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let config = &self.config;
        let mut bytes = Vec::new();
        let mut serializer = serde_json::Serializer::new(&mut bytes);

        let encode = |err: serde_json::Error| Error::new("failed to encode record").with_source(err);
        let mut map = serializer.serialize_map(None).map_err(encode)?;

        if !config.level_key.is_empty() {
            map.serialize_entry(config.level_key, record.level().as_str())
                .map_err(encode)?;
        }
        if !config.time_key.is_empty() {
            map.serialize_entry(config.time_key, &config.format_time(record.time()))
                .map_err(encode)?;
        }
        if !config.name_key.is_empty() {
            if let Some(name) = record.name() {
                map.serialize_entry(config.name_key, name).map_err(encode)?;
            }
        }
        if !config.caller_key.is_empty() {
            if let Some(caller) = config.format_caller(record) {
                map.serialize_entry(config.caller_key, &caller)
                    .map_err(encode)?;
            }
        }
        if !config.message_key.is_empty() {
            map.serialize_entry(config.message_key, record.message())
                .map_err(encode)?;
        }
        for field in record.fields() {
            map.serialize_entry(field.key(), field.value())
                .map_err(encode)?;
        }
        if !config.stacktrace_key.is_empty() {
            if let Some(stacktrace) = record.stacktrace() {
                map.serialize_entry(config.stacktrace_key, stacktrace)
                    .map_err(encode)?;
            }
        }
        map.end().map_err(encode)?;

        bytes.extend_from_slice(config.line_ending.as_bytes());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::time::UNIX_EPOCH;

    use jiff::tz::TimeZone;

    use super::*;
    use crate::field;
    use crate::record::Level;

    #[test]
    fn test_format_in_schema_order() {
        let context = [field::string("hostName", "node-1")];
        let fields = [
            field::with("trace", "123123123"),
            field::duration("elapsed", Duration::from_millis(250)),
        ];
        let record = Record::builder()
            .time(UNIX_EPOCH + Duration::from_millis(1_723_309_972_123))
            .level(Level::Error)
            .file(Some("src/lib.rs"))
            .line(Some(7))
            .message("charge failed")
            .context(&context)
            .fields(&fields)
            .stacktrace(Some("   0: main"))
            .build();

        let layout = JsonLayout::new(LayoutConfig::default().timezone(TimeZone::UTC));
        let text = String::from_utf8(layout.format(&record).unwrap()).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"{"level":"error","time":"2024-08-10T17:12:52.123+0000","file":"src/lib.rs:7","#,
                r#""msg":"charge failed","hostName":"node-1","trace":"123123123","elapsed":0.25,"#,
                r#""stacktrace":"   0: main"}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_empty_keys_are_omitted() {
        let config = LayoutConfig {
            time_key: "",
            caller_key: "",
            ..LayoutConfig::default()
        };
        let record = Record::builder()
            .level(Level::Debug)
            .name(Some("worker"))
            .file(Some("src/lib.rs"))
            .message("tick")
            .build();

        let text = String::from_utf8(JsonLayout::new(config).format(&record).unwrap()).unwrap();
        assert_eq!(text, "{\"level\":\"debug\",\"logger\":\"worker\",\"msg\":\"tick\"}\n");
    }
}
