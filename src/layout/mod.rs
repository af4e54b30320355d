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

//! Layouts turn a [`Record`] into bytes.
//!
//! Layouts are looked up by encoding name through [`resolve`]. An unknown or empty name falls
//! back to the console layout without complaint.

use std::fmt;
use std::time::SystemTime;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::record::Record;

mod console;
mod json;

pub use self::console::ConsoleLayout;
pub use self::json::JsonLayout;

/// A layout for formatting log records.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Formats a log record, including the trailing line ending.
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error>;
}

impl<T: Layout> From<T> for Box<dyn Layout> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// The record schema shared by all layouts.
///
/// An empty key drops the corresponding entry from the output.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Key of the observed time.
    pub time_key: &'static str,
    /// Key of the lowercase level text.
    pub level_key: &'static str,
    /// Key of the full logger name.
    pub name_key: &'static str,
    /// Key of the `path/to/file.rs:LINE` call site.
    pub caller_key: &'static str,
    /// Key of the message.
    pub message_key: &'static str,
    /// Key of the captured stack trace.
    pub stacktrace_key: &'static str,
    /// Appended to every formatted record.
    pub line_ending: &'static str,
    /// Time zone of the ISO-8601 timestamps.
    pub timezone: TimeZone,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            time_key: "time",
            level_key: "level",
            name_key: "logger",
            caller_key: "file",
            message_key: "msg",
            stacktrace_key: "stacktrace",
            line_ending: "\n",
            timezone: TimeZone::system(),
        }
    }
}

impl LayoutConfig {
    /// Set the time zone for timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use proof::layout::LayoutConfig;
    ///
    /// let config = LayoutConfig::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    // ISO-8601 with millisecond precision and a numeric offset.
    fn format_time(&self, time: SystemTime) -> String {
        match Timestamp::try_from(time) {
            Ok(ts) => ts
                .to_zoned(self.timezone.clone())
                .strftime("%Y-%m-%dT%H:%M:%S.%3f%z")
                .to_string(),
            // out of jiff's range; only happens with a broken system clock
            Err(_) => String::new(),
        }
    }

    fn format_caller(&self, record: &Record) -> Option<String> {
        let file = record.file()?;
        Some(match record.line() {
            Some(line) => format!("{file}:{line}"),
            None => file.to_string(),
        })
    }
}

/// The encodings known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Tab separated, human-oriented text.
    #[default]
    Console,
    /// One JSON object per record.
    Json,
}

impl Encoding {
    /// The registered name of this encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Console => "console",
            Encoding::Json => "json",
        }
    }

    /// Look up an encoding by name, falling back to [`Encoding::Console`].
    pub fn from_name(name: &str) -> Encoding {
        match name {
            "json" => Encoding::Json,
            _ => Encoding::Console,
        }
    }
}

impl AsRef<str> for Encoding {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

/// Builds a layout from the record schema.
pub type Constructor = fn(LayoutConfig) -> Box<dyn Layout>;

fn console(config: LayoutConfig) -> Box<dyn Layout> {
    Box::new(ConsoleLayout::new(config))
}

fn json(config: LayoutConfig) -> Box<dyn Layout> {
    Box::new(JsonLayout::new(config))
}

const REGISTRY: [(Encoding, Constructor); 2] =
    [(Encoding::Console, console), (Encoding::Json, json)];

/// Find the constructor registered under `name`.
pub fn constructor(name: &str) -> Option<Constructor> {
    REGISTRY
        .iter()
        .find(|(encoding, _)| encoding.name() == name)
        .map(|(_, constructor)| *constructor)
}

/// Build the layout registered under `name`, or the console layout if there is none.
///
/// # Examples
///
/// ```
/// use proof::layout;
/// use proof::layout::LayoutConfig;
///
/// let json = layout::resolve("json", LayoutConfig::default());
/// let fallback = layout::resolve("yaml", LayoutConfig::default());
/// assert!(format!("{fallback:?}").starts_with("ConsoleLayout"));
/// # let _ = json;
/// ```
pub fn resolve(name: &str, config: LayoutConfig) -> Box<dyn Layout> {
    let constructor = constructor(name).unwrap_or(console);
    constructor(config)
}
