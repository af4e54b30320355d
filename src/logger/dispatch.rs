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

use std::io::Write;
use std::sync::Arc;

use crate::Error;
use crate::append::Append;
use crate::layout::Layout;
use crate::record::Level;
use crate::record::LevelFilter;
use crate::record::Record;

/// A leveled core: a level filter, a layout and the sinks that receive its output.
///
/// A record accepted by the filter is encoded once, and the same bytes are written to every
/// sink.
#[derive(Debug)]
pub struct Dispatch {
    filter: LevelFilter,
    layout: Box<dyn Layout>,
    appends: Vec<Arc<dyn Append>>,
}

impl Dispatch {
    pub(super) fn new(
        filter: LevelFilter,
        layout: Box<dyn Layout>,
        appends: Vec<Arc<dyn Append>>,
    ) -> Self {
        Self {
            filter,
            layout,
            appends,
        }
    }

    /// Whether records of `level` pass this dispatch's filter.
    pub fn enabled(&self, level: Level) -> bool {
        self.filter.test(level)
    }

    /// The number of sinks of this dispatch.
    pub fn sink_count(&self) -> usize {
        self.appends.len()
    }

    pub(super) fn log(&self, record: &Record) {
        if !self.enabled(record.level()) || self.appends.is_empty() {
            return;
        }

        let bytes = match self.layout.format(record) {
            Ok(bytes) => bytes,
            Err(err) => {
                handle_log_error(record, err);
                return;
            }
        };

        // a failing sink must not starve the others
        for append in &self.appends {
            if let Err(err) = append.append(&bytes) {
                handle_log_error(record, err);
            }
        }
    }

    pub(super) fn flush(&self, errors: &mut Vec<Error>) {
        for append in &self.appends {
            if let Err(err) = append.flush() {
                errors.push(err);
            }
        }
    }
}

fn handle_log_error(record: &Record, error: Error) {
    let _ = write!(
        std::io::stderr(),
        r###"
Error perform logging.
    Attempted to log: {message}
    Record: {record:?}
    Error: {error:?}
"###,
        message = record.message(),
        record = record,
        error = error,
    );
}
