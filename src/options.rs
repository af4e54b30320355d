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

//! Declarative configuration and assembly of the logging pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use jiff::tz::TimeZone;

use crate::Error;
use crate::append::Append;
use crate::append::Stdout;
use crate::append::file::Division;
use crate::append::file::RollingPolicy;
use crate::append::file::RotationUnit;
use crate::field;
use crate::layout;
use crate::layout::LayoutConfig;
use crate::logger;
use crate::logger::Logger;
use crate::record::Level;
use crate::record::LevelFilter;

/// The environment variable read into the `serviceName` field.
pub const SERVICE_NAME_ENV: &str = "project";
/// The environment variable read into the `hostName` field.
pub const HOST_NAME_ENV: &str = "HOSTNAME";

/// Options for assembling a [`Logger`].
///
/// Records below warn go to the info sinks: the console (unless suppressed) and the info file.
/// Once an error file is set, records at warn and above go to the warn sinks instead: the
/// console and the error file. Without an error file every record goes to the info sinks.
///
/// # Examples
///
/// ```
/// use proof::Options;
/// use proof::append::file::Division;
/// use proof::append::file::RotationUnit;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = Options::new()
///     .division(Division::Time)
///     .rotation_unit(RotationUnit::Day)
///     .encoding("json")
///     .info_file(dir.path().join("application.log"))
///     .error_file(dir.path().join("application_err.log"))
///     .close_console_display()
///     .build();
///
/// logger.info("info level test", &[proof::with("trace", "123123123")]);
/// logger.flush().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    encoding: String,
    info_file: Option<PathBuf>,
    error_file: Option<PathBuf>,
    policy: RollingPolicy,
    level_separate: bool,
    caller: bool,
    close_display: bool,
    development: bool,
    min_level: Level,
    timezone: Option<TimeZone>,
    console_sink: Option<Arc<dyn Append>>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    /// Create options with the default configuration: console encoding, daily time rotation,
    /// console display on, no files.
    pub fn new() -> Options {
        Options {
            encoding: layout::Encoding::default().name().to_string(),
            info_file: None,
            error_file: None,
            policy: RollingPolicy::default(),
            level_separate: false,
            caller: false,
            close_display: false,
            development: true,
            min_level: Level::Debug,
            timezone: None,
            console_sink: None,
        }
    }

    /// Set the encoding by name, `"console"` or `"json"`. Any other name, including the empty
    /// one, falls back to `"console"`.
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Write records below warn (all records without an error file) to `path`.
    pub fn info_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.info_file = Some(path.into());
        self
    }

    /// Write records at warn and above to `path`, separating them from the info file.
    pub fn error_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_file = Some(path.into());
        self.level_separate = true;
        self
    }

    /// Set how the files rotate.
    pub fn division(mut self, division: Division) -> Self {
        self.policy.division = division;
        self
    }

    /// Set the period of time rotation.
    pub fn rotation_unit(mut self, unit: RotationUnit) -> Self {
        self.policy.unit = unit;
        self
    }

    /// Set the maximum file size in megabytes for size rotation. Zero means 100.
    pub fn max_size(mut self, megabytes: u64) -> Self {
        self.policy.max_size = megabytes;
        self
    }

    /// Set the number of backups kept by size rotation. Zero keeps all.
    pub fn max_backups(mut self, n: usize) -> Self {
        self.policy.max_backups = n;
        self
    }

    /// Set the retention window in days of rotated files. Zero keeps all.
    pub fn max_age(mut self, days: u64) -> Self {
        self.policy.max_age = days;
        self
    }

    /// Gzip the backups of size rotation.
    pub fn compress(mut self, compress: bool) -> Self {
        self.policy.compress = compress;
        self
    }

    /// Annotate records with their call site.
    pub fn caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Stop mirroring records to the console.
    pub fn close_console_display(mut self) -> Self {
        self.close_display = true;
        self
    }

    /// Force stack trace capture on warn and above, regardless of `RUST_BACKTRACE`. Default to
    /// true.
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// Drop records more verbose than `level` before routing. Default to [`Level::Debug`].
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Render timestamps in `tz` instead of the system time zone.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = Some(tz);
        self
    }

    /// Replace the standard output as the console sink.
    pub fn console_sink(mut self, sink: impl Append) -> Self {
        self.console_sink = Some(Arc::new(sink));
        self
    }

    /// Whether warn and above are routed to a separate sink list. True once an error file is
    /// set.
    pub fn level_separate(&self) -> bool {
        self.level_separate
    }

    /// Whether an info file is configured.
    pub fn is_output(&self) -> bool {
        self.info_file.is_some()
    }

    /// The encoding that assembly resolves to.
    pub fn encoding_name(&self) -> &'static str {
        layout::Encoding::from_name(&self.encoding).name()
    }

    /// Assemble the logger.
    ///
    /// # Errors
    ///
    /// Return an error if a log file cannot be set up.
    pub fn try_build(&self) -> Result<Logger, Error> {
        let mut config = LayoutConfig::default();
        if let Some(tz) = &self.timezone {
            config = config.timezone(tz.clone());
        }

        let mut info_sinks: Vec<Arc<dyn Append>> = vec![];
        let mut warn_sinks: Vec<Arc<dyn Append>> = vec![];

        if !self.close_display {
            let console: Arc<dyn Append> = match &self.console_sink {
                Some(sink) => sink.clone(),
                None => Arc::new(Stdout::default()),
            };
            info_sinks.push(console.clone());
            warn_sinks.push(console);
        }

        if let Some(path) = &self.info_file {
            info_sinks.push(Arc::new(self.policy.build(path)?));
        }
        if let Some(path) = &self.error_file {
            warn_sinks.push(Arc::new(self.policy.build(path)?));
        }

        let mut builder = logger::builder();
        if self.level_separate {
            let info_layout = layout::resolve(&self.encoding, config.clone());
            let warn_layout = layout::resolve(&self.encoding, config);
            builder = builder
                .dispatch(|d| {
                    info_sinks.into_iter().fold(
                        d.filter(LevelFilter::MoreVerbose(Level::Warn))
                            .layout(info_layout),
                        |d, sink| d.append_shared(sink),
                    )
                })
                .dispatch(|d| {
                    warn_sinks.into_iter().fold(
                        d.filter(LevelFilter::MoreSevereEqual(Level::Warn))
                            .layout(warn_layout),
                        |d, sink| d.append_shared(sink),
                    )
                });
        } else {
            let layout = layout::resolve(&self.encoding, config);
            builder = builder.dispatch(|d| {
                info_sinks
                    .into_iter()
                    .fold(d.filter(LevelFilter::All).layout(layout), |d, sink| {
                        d.append_shared(sink)
                    })
            });
        }

        Ok(builder
            .context(tag_fields())
            .caller(self.caller)
            .stacktrace(LevelFilter::MoreSevereEqual(Level::Warn))
            .development(self.development)
            .max_level(LevelFilter::MoreSevereEqual(self.min_level))
            .build())
    }

    /// Assemble the logger.
    ///
    /// # Panics
    ///
    /// Panics if a log file cannot be set up. A logger that cannot write where it was told to is
    /// a startup misconfiguration.
    pub fn build(&self) -> Logger {
        match self.try_build() {
            Ok(logger) => logger,
            Err(err) => panic!("failed to assemble logger: {err}"),
        }
    }

    /// Assemble the logger and install it as the process-wide default logger.
    ///
    /// Calling it again replaces the default logger; the previous one is flushed and released.
    /// With the `bridge-log` feature, records of the `log` crate are forwarded as well.
    ///
    /// # Panics
    ///
    /// Panics if a log file cannot be set up.
    pub fn apply(&self) -> Arc<Logger> {
        let logger = Arc::new(self.build());
        logger::set_default_logger(logger.clone());

        #[cfg(feature = "bridge-log")]
        crate::bridge::setup_log_crate();

        logger
    }
}

fn tag_fields() -> [field::Field; 2] {
    let var = |key: &str| std::env::var(key).unwrap_or_default();
    [
        field::string("serviceName", var(SERVICE_NAME_ENV)),
        field::string("hostName", var(HOST_NAME_ENV)),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, Default)]
    struct Capture(Mutex<Vec<u8>>);

    impl Append for Capture {
        fn append(&self, bytes: &[u8]) -> Result<(), Error> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(())
        }
    }

    fn sink_counts(logger: &Logger) -> Vec<usize> {
        logger.dispatches().iter().map(|d| d.sink_count()).collect()
    }

    #[test]
    fn test_error_file_implies_level_separation() {
        let options = Options::new();
        assert!(!options.level_separate());
        assert!(!options.is_output());

        let options = options.info_file("info.log");
        assert!(!options.level_separate());
        assert!(options.is_output());

        let options = options.error_file("error.log");
        assert!(options.level_separate());
    }

    #[test]
    fn test_encoding_falls_back_to_console() {
        assert_eq!(Options::new().encoding_name(), "console");
        assert_eq!(Options::new().encoding("json").encoding_name(), "json");
        assert_eq!(Options::new().encoding("").encoding_name(), "console");
        assert_eq!(Options::new().encoding("yaml").encoding_name(), "console");
    }

    #[test]
    fn test_sink_lists() {
        let temp_dir = TempDir::new().unwrap();
        let info = temp_dir.path().join("info.log");
        let error = temp_dir.path().join("error.log");

        let logger = Options::new()
            .console_sink(Capture::default())
            .info_file(&info)
            .error_file(&error)
            .build();
        assert_eq!(sink_counts(&logger), [2, 2]);

        let logger = Options::new()
            .console_sink(Capture::default())
            .info_file(&info)
            .build();
        assert_eq!(sink_counts(&logger), [2]);

        let logger = Options::new()
            .close_console_display()
            .error_file(&error)
            .build();
        assert_eq!(sink_counts(&logger), [0, 1]);

        let logger = Options::new().close_console_display().build();
        assert_eq!(sink_counts(&logger), [0]);
        assert!(logger.flush().is_ok());
    }

    #[test]
    fn test_routing_partitions_levels() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Options::new()
            .close_console_display()
            .error_file(temp_dir.path().join("error.log"))
            .build();

        for level in Level::ALL {
            let accepting = logger
                .dispatches()
                .iter()
                .filter(|d| d.enabled(level))
                .count();
            assert_eq!(accepting, 1, "{level}");
        }
        assert!(logger.dispatches()[1].enabled(Level::Warn));
    }

    #[test]
    fn test_min_level() {
        let logger = Options::new().console_sink(Capture::default()).build();
        assert!(logger.enabled(Level::Debug));

        let logger = Options::new()
            .console_sink(Capture::default())
            .min_level(Level::Info)
            .build();
        assert!(!logger.enabled(Level::Debug));
        assert!(logger.enabled(Level::Info));
    }

    #[test]
    fn test_unusable_path_fails_assembly() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = Options::new()
            .info_file(blocker.join("info.log"))
            .try_build()
            .unwrap_err();
        assert_eq!(err.message(), "failed to create log directory");
    }

    #[test]
    #[should_panic(expected = "failed to assemble logger")]
    fn test_build_panics_on_unusable_path() {
        let _ = Options::new().info_file("/").build();
    }
}
