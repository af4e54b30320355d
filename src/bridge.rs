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

//! Forward records of the [`log`] crate to the default logger.

use std::borrow::Cow;

use crate::logger::try_default_logger;
use crate::record::Level;

struct LogCrateLogger(());

fn to_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        try_default_logger().is_some_and(|logger| logger.enabled(to_level(metadata.level())))
    }

    fn log(&self, record: &log::Record) {
        let Some(logger) = try_default_logger() else {
            return;
        };

        let level = to_level(record.level());
        if !logger.enabled(level) {
            return;
        }

        let message = match record.args().as_str() {
            Some(message) => Cow::Borrowed(message),
            None => Cow::Owned(record.args().to_string()),
        };
        logger.forward(
            level,
            &message,
            Some(record.target()),
            record.file(),
            record.line(),
        );
    }

    fn flush(&self) {
        if let Some(logger) = try_default_logger() {
            if let Err(err) = logger.flush() {
                eprintln!("failed to flush logger: {err}");
            }
        }
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] to set up a forwarding logger, and all records of the
/// log crate are forwarded to the default logger installed by [`Options::apply`]. Records logged
/// before any default logger is installed are dropped. `Trace` records arrive as
/// [`Level::Debug`].
///
/// [`Options::apply`] calls this function for you.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// [`Options::apply`]: crate::Options::apply
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger unless it is already set up.
///
/// A log crate global logger installed by another library is left alone.
pub fn setup_log_crate() {
    // a second call finds the forwarding logger in place
    let _ = try_setup_log_crate();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_maps_to_debug() {
        assert_eq!(to_level(log::Level::Trace), Level::Debug);
        assert_eq!(to_level(log::Level::Warn), Level::Warn);
        assert_eq!(to_level(log::Level::Error), Level::Error);
    }
}
