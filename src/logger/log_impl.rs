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

use std::backtrace::Backtrace;
use std::backtrace::BacktraceStatus;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::SystemTime;

use crate::Error;
use crate::field::Field;
use crate::logger::Dispatch;
use crate::record::Level;
use crate::record::LevelFilter;
use crate::record::Record;

/// The logging facade.
///
/// A logger fans every record out to its [`Dispatch`]es. Child loggers made by
/// [`named`](Logger::named) and [`with`](Logger::with) share the same dispatches, so they write
/// to the same sinks.
///
/// All leveled calls capture their call site with `#[track_caller]`.
#[derive(Debug, Clone)]
pub struct Logger {
    dispatches: Arc<[Dispatch]>,
    context: Arc<[Field]>,
    name: Option<Arc<str>>,
    caller: bool,
    stacktrace: LevelFilter,
    development: bool,
    max_level: LevelFilter,
}

impl Logger {
    pub(super) fn new(
        dispatches: Vec<Dispatch>,
        context: Vec<Field>,
        name: Option<String>,
        caller: bool,
        stacktrace: LevelFilter,
        development: bool,
        max_level: LevelFilter,
    ) -> Self {
        Self {
            dispatches: dispatches.into(),
            context: context.into(),
            name: name.map(Arc::from),
            caller,
            stacktrace,
            development,
            max_level,
        }
    }

    /// The dispatches of this logger.
    pub fn dispatches(&self) -> &[Dispatch] {
        &self.dispatches
    }

    /// The full name of this logger, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether a record of `level` would reach any sink.
    pub fn enabled(&self, level: Level) -> bool {
        self.max_level.test(level) && self.dispatches.iter().any(|d| d.enabled(level))
    }

    /// Create a child logger whose name is this logger's name joined with `name` by a dot.
    #[must_use]
    pub fn named(&self, name: &str) -> Logger {
        let name = match &self.name {
            Some(parent) if !name.is_empty() => format!("{parent}.{name}"),
            Some(parent) => parent.to_string(),
            None => name.to_string(),
        };

        Logger {
            name: (!name.is_empty()).then(|| Arc::from(name)),
            ..self.clone()
        }
    }

    /// Create a child logger that attaches `fields` to every record, after this logger's own
    /// context fields.
    #[must_use]
    pub fn with(&self, fields: &[Field]) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }

        let context = self.context.iter().chain(fields).cloned().collect::<Vec<_>>();
        Logger {
            context: context.into(),
            ..self.clone()
        }
    }

    /// Log a message at `level`.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: &[Field]) {
        if self.enabled(level) {
            self.emit(level, message, fields, Location::caller());
        }
    }

    /// Log a message at the debug level.
    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.log(Level::Debug, message, fields);
    }

    /// Log a message at the info level.
    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        self.log(Level::Info, message, fields);
    }

    /// Log a message at the warn level.
    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.log(Level::Warn, message, fields);
    }

    /// Log a message at the error level.
    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field]) {
        self.log(Level::Error, message, fields);
    }

    /// Log a message at the fatal level, flush every sink, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Field]) -> ! {
        self.log(Level::Fatal, message, fields);
        self.exit()
    }

    /// Log a formatted message at `level`. Formatting is skipped if the level is disabled.
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            let message = fmt::format(args);
            self.emit(level, &message, &[], Location::caller());
        }
    }

    /// Log a formatted message at the debug level.
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args);
    }

    /// Log a formatted message at the info level.
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args);
    }

    /// Log a formatted message at the warn level.
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Warn, args);
    }

    /// Log a formatted message at the error level.
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Error, args);
    }

    /// Log a formatted message at the fatal level, flush every sink, then exit the process with
    /// status 1.
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.logf(Level::Fatal, args);
        self.exit()
    }

    /// Flush every sink of every dispatch.
    ///
    /// # Errors
    ///
    /// Return an error carrying one source per sink that failed to flush. Every sink is flushed
    /// even if an earlier one fails.
    pub fn flush(&self) -> Result<(), Error> {
        let mut errors = vec![];
        for dispatch in self.dispatches.iter() {
            dispatch.flush(&mut errors);
        }

        if errors.is_empty() {
            return Ok(());
        }

        let mut error = Error::new("failed to flush logger");
        for err in errors {
            error = error.with_source(err);
        }
        Err(error)
    }

    fn exit(&self) -> ! {
        if let Err(err) = self.flush() {
            eprintln!("{err}");
        }
        std::process::exit(1)
    }

    fn emit(&self, level: Level, message: &str, fields: &[Field], location: &Location<'_>) {
        let (file, line) = if self.caller {
            (Some(location.file()), Some(location.line()))
        } else {
            (None, None)
        };
        self.dispatch(level, message, fields, self.name.as_deref(), file, line);
    }

    /// Log a record that was produced elsewhere, with its own name and call site.
    ///
    /// The call site is kept only if caller annotation is on.
    #[cfg(feature = "bridge-log")]
    pub(crate) fn forward(
        &self,
        level: Level,
        message: &str,
        name: Option<&str>,
        file: Option<&str>,
        line: Option<u32>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let (file, line) = if self.caller { (file, line) } else { (None, None) };
        self.dispatch(level, message, &[], name.or(self.name.as_deref()), file, line);
    }

    fn dispatch(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        name: Option<&str>,
        file: Option<&str>,
        line: Option<u32>,
    ) {
        let stacktrace = self.capture_stacktrace(level);
        let record = Record::builder()
            .time(SystemTime::now())
            .level(level)
            .name(name)
            .file(file)
            .line(line)
            .message(message)
            .context(&self.context)
            .fields(fields)
            .stacktrace(stacktrace.as_deref())
            .build();

        for dispatch in self.dispatches.iter() {
            dispatch.log(&record);
        }
    }

    fn capture_stacktrace(&self, level: Level) -> Option<String> {
        if !self.stacktrace.test(level) {
            return None;
        }

        // development mode ignores RUST_BACKTRACE
        let backtrace = if self.development {
            Backtrace::force_capture()
        } else {
            Backtrace::capture()
        };
        match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        }
    }
}
