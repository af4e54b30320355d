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

//! Log records and levels.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use crate::Error;
use crate::field::Field;

/// A log record that flows through every [`Dispatch`](crate::logger::Dispatch).
#[derive(Clone, Debug)]
pub struct Record<'a> {
    // the observed time
    now: SystemTime,

    // the metadata
    level: Level,
    name: Option<&'a str>,
    file: Option<&'a str>,
    line: Option<u32>,

    // the payload
    message: &'a str,

    // structural logging
    context: &'a [Field],
    fields: &'a [Field],
    stacktrace: Option<&'a str>,
}

impl<'a> Record<'a> {
    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.now
    }

    /// The verbosity level of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The full name of the logger, if it has one.
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// The source file containing the call site, if caller annotation is enabled.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// The line of the call site, if caller annotation is enabled.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn message(&self) -> &'a str {
        self.message
    }

    /// The fields attached to the logger, followed by the fields of this call.
    pub fn fields(&self) -> impl Iterator<Item = &'a Field> + use<'a> {
        self.context.iter().chain(self.fields.iter())
    }

    /// Whether the record carries any field at all.
    pub fn has_fields(&self) -> bool {
        !self.context.is_empty() || !self.fields.is_empty()
    }

    /// The captured stack trace.
    pub fn stacktrace(&self) -> Option<&'a str> {
        self.stacktrace
    }

    /// Returns a new builder.
    pub fn builder() -> RecordBuilder<'a> {
        RecordBuilder::default()
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    record: Record<'a>,
}

impl Default for RecordBuilder<'_> {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                now: SystemTime::now(),
                level: Level::Info,
                name: None,
                file: None,
                line: None,
                message: "",
                context: &[],
                fields: &[],
                stacktrace: None,
            },
        }
    }
}

impl<'a> RecordBuilder<'a> {
    /// Set [`time`](Record::time).
    pub fn time(mut self, now: SystemTime) -> Self {
        self.record.now = now;
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`name`](Record::name).
    pub fn name(mut self, name: Option<&'a str>) -> Self {
        self.record.name = name;
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: Option<&'a str>) -> Self {
        self.record.file = file;
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.record.line = line;
        self
    }

    /// Set [`message`](Record::message).
    pub fn message(mut self, message: &'a str) -> Self {
        self.record.message = message;
        self
    }

    /// Set the fields attached to the logger.
    pub fn context(mut self, context: &'a [Field]) -> Self {
        self.record.context = context;
        self
    }

    /// Set the fields of this call.
    pub fn fields(mut self, fields: &'a [Field]) -> Self {
        self.record.fields = fields;
        self
    }

    /// Set [`stacktrace`](Record::stacktrace).
    pub fn stacktrace(mut self, stacktrace: Option<&'a str>) -> Self {
        self.record.stacktrace = stacktrace;
        self
    }

    /// Invoke the builder and return a `Record`
    pub fn build(self) -> Record<'a> {
        self.record
    }
}

/// The severity of a record, ordered from the most severe to the most verbose.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Unrecoverable errors; the process exits after emitting.
    Fatal,
    /// Designates very serious errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
}

impl Level {
    /// Return the lowercase name of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// All levels, the most severe first.
    pub const ALL: [Level; 5] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for level in Level::ALL {
            if s.eq_ignore_ascii_case(level.as_str()) {
                return Ok(level);
            }
        }

        Err(Error::new(format!("malformed level: {s:?}")))
    }
}

/// A predicate over [`Level`]s, used to gate a [`Dispatch`](crate::logger::Dispatch).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LevelFilter {
    /// Disables all levels.
    Off,
    /// Enables if the target level is more severe than the filter level.
    MoreSevere(Level),
    /// Enables if the target level is more severe than or equal to the filter
    /// level.
    MoreSevereEqual(Level),
    /// Enables if the target level is more verbose than the filter level.
    MoreVerbose(Level),
    /// Enables if the target level is more verbose than or equal to the filter
    /// level.
    MoreVerboseEqual(Level),
    /// Enables all levels.
    All,
}

impl LevelFilter {
    /// Checks the given level if satisfies the filter condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use proof::record::Level;
    /// use proof::record::LevelFilter;
    ///
    /// let level_filter = LevelFilter::MoreSevere(Level::Info);
    ///
    /// assert_eq!(level_filter.test(Level::Debug), false);
    /// assert_eq!(level_filter.test(Level::Info), false);
    /// assert_eq!(level_filter.test(Level::Warn), true);
    /// assert_eq!(level_filter.test(Level::Fatal), true);
    /// ```
    pub fn test(&self, level: Level) -> bool {
        match self {
            LevelFilter::Off => false,
            LevelFilter::MoreSevere(l) => level < *l,
            LevelFilter::MoreSevereEqual(l) => level <= *l,
            LevelFilter::MoreVerbose(l) => level > *l,
            LevelFilter::MoreVerboseEqual(l) => level >= *l,
            LevelFilter::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("fatal".parse::<Level>().unwrap(), Level::Fatal);
        assert!("verbose".parse::<Level>().is_err());
        assert_eq!(Level::Error.to_string(), "error");
    }

    #[test]
    fn test_warn_partition_is_exact() {
        let info_branch = LevelFilter::MoreVerbose(Level::Warn);
        let warn_branch = LevelFilter::MoreSevereEqual(Level::Warn);

        for level in Level::ALL {
            assert!(
                info_branch.test(level) ^ warn_branch.test(level),
                "{level} must be accepted by exactly one branch"
            );
        }
        assert!(warn_branch.test(Level::Warn));
        assert!(!info_branch.test(Level::Warn));
        assert!(info_branch.test(Level::Debug));
        assert!(warn_branch.test(Level::Fatal));
    }

    #[test]
    fn test_record_fields_put_context_first() {
        let context = [crate::field::string("serviceName", "billing")];
        let fields = [crate::field::int("attempt", 3)];
        let record = Record::builder()
            .message("retrying")
            .context(&context)
            .fields(&fields)
            .build();

        let keys = record.fields().map(|f| f.key()).collect::<Vec<_>>();
        assert_eq!(keys, ["serviceName", "attempt"]);
        assert!(record.has_fields());
        assert!(!Record::builder().build().has_fields());
    }
}
