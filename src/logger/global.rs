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

use arc_swap::ArcSwapOption;

use crate::logger::Logger;

static DEFAULT_LOGGER: ArcSwapOption<Logger> = ArcSwapOption::const_empty();

/// Install `logger` as the process-wide default logger, returning the previous one.
///
/// The previous logger is flushed. Its sinks close once the last in-flight call that still
/// holds it completes.
pub fn set_default_logger(logger: Arc<Logger>) -> Option<Arc<Logger>> {
    let previous = DEFAULT_LOGGER.swap(Some(logger));
    if let Some(previous) = &previous {
        if let Err(err) = previous.flush() {
            eprintln!("failed to flush previous logger: {err}");
        }
    }
    previous
}

/// The process-wide default logger, if one is installed.
pub fn try_default_logger() -> Option<Arc<Logger>> {
    DEFAULT_LOGGER.load_full()
}

/// The process-wide default logger.
///
/// # Panics
///
/// Panics if no logger has been installed with [`Options::apply`](crate::Options::apply) or
/// [`LoggerBuilder::apply`](crate::logger::LoggerBuilder::apply).
#[track_caller]
pub fn default_logger() -> Arc<Logger> {
    match try_default_logger() {
        Some(logger) => logger,
        None => panic!("logger is not initialized: call `Options::apply` before logging"),
    }
}
