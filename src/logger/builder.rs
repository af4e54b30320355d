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

use std::sync::Arc;

use crate::append::Append;
use crate::field::Field;
use crate::layout::ConsoleLayout;
use crate::layout::Layout;
use crate::layout::LayoutConfig;
use crate::logger::Dispatch;
use crate::logger::Logger;
use crate::logger::set_default_logger;
use crate::record::Level;
use crate::record::LevelFilter;

/// Create a new empty [`LoggerBuilder`] instance for configuring log dispatching.
///
/// # Examples
///
/// ```
/// use proof::append;
/// use proof::record::Level;
/// use proof::record::LevelFilter;
///
/// let logger = proof::logger::builder()
///     .dispatch(|d| {
///         d.filter(LevelFilter::MoreSevereEqual(Level::Warn))
///             .append(append::Stdout::default())
///     })
///     .build();
///
/// logger.warn("disk almost full", &[]);
/// ```
pub fn builder() -> LoggerBuilder {
    LoggerBuilder::default()
}

/// A builder for configuring the logger. See also [`builder`] for a fluent API.
#[must_use = "call `build` to create the logger or `apply` to set the default logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    dispatches: Vec<Dispatch>,
    context: Vec<Field>,
    name: Option<String>,
    caller: bool,
    stacktrace: LevelFilter,
    development: bool,
    max_level: LevelFilter,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            dispatches: vec![],
            context: vec![],
            name: None,
            caller: false,
            stacktrace: LevelFilter::MoreSevereEqual(Level::Warn),
            development: false,
            max_level: LevelFilter::All,
        }
    }
}

impl LoggerBuilder {
    /// Register a new dispatch with the [`LoggerBuilder`].
    pub fn dispatch<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DispatchBuilder) -> DispatchBuilder,
    {
        self.dispatches.push(f(DispatchBuilder::default()).build());
        self
    }

    /// Attach `fields` to every record.
    pub fn context(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.context.extend(fields);
        self
    }

    /// Set the logger name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Annotate records with their call site.
    pub fn caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Set which levels capture a stack trace. Default to warn and above.
    pub fn stacktrace(mut self, filter: LevelFilter) -> Self {
        self.stacktrace = filter;
        self
    }

    /// In development mode, stack traces are captured regardless of `RUST_BACKTRACE`.
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// Set the gate applied to every record before any dispatch sees it.
    pub fn max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }

    /// Build the logger.
    pub fn build(self) -> Logger {
        Logger::new(
            self.dispatches,
            self.context,
            self.name,
            self.caller,
            self.stacktrace,
            self.development,
            self.max_level,
        )
    }

    /// Build the logger and install it as the default logger.
    ///
    /// A previously installed logger is flushed and released.
    pub fn apply(self) -> Arc<Logger> {
        let logger = Arc::new(self.build());
        set_default_logger(logger.clone());
        logger
    }
}

/// A builder for a [`Dispatch`].
///
/// Without an explicit layout, records are encoded with a [`ConsoleLayout`] over the default
/// schema. A dispatch without appends is valid and writes nowhere.
#[derive(Debug)]
pub struct DispatchBuilder {
    filter: LevelFilter,
    layout: Option<Box<dyn Layout>>,
    appends: Vec<Arc<dyn Append>>,
}

impl Default for DispatchBuilder {
    fn default() -> Self {
        Self {
            filter: LevelFilter::All,
            layout: None,
            appends: vec![],
        }
    }
}

impl DispatchBuilder {
    /// Set the level filter of this dispatch.
    pub fn filter(mut self, filter: LevelFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the layout of this dispatch.
    pub fn layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Add an appender to this dispatch.
    ///
    /// Pass an `Arc` to share one appender between dispatches.
    pub fn append(mut self, append: impl Append) -> Self {
        self.appends.push(Arc::new(append));
        self
    }

    pub(crate) fn append_shared(mut self, append: Arc<dyn Append>) -> Self {
        self.appends.push(append);
        self
    }

    fn build(self) -> Dispatch {
        let layout = self
            .layout
            .unwrap_or_else(|| ConsoleLayout::new(LayoutConfig::default()).into());
        Dispatch::new(self.filter, layout, self.appends)
    }
}
