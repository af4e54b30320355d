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
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::append::Append;
use crate::append::file::SizeRollingWriter;
use crate::append::file::TimeRollingWriter;

#[derive(Debug)]
enum Writer {
    Time(TimeRollingWriter),
    Size(SizeRollingWriter),
}

impl Writer {
    fn as_write(&mut self) -> &mut dyn Write {
        match self {
            Writer::Time(w) => w,
            Writer::Size(w) => w,
        }
    }
}

/// An appender that writes encoded records to rotating files.
///
/// Each record is written while holding the lock, so records never interleave and never
/// straddle a rotation.
#[derive(Debug)]
pub struct RollingFile {
    writer: Mutex<Writer>,
}

impl RollingFile {
    fn writer(&self) -> MutexGuard<'_, Writer> {
        // a poisoned lock still guards a usable file
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl From<TimeRollingWriter> for RollingFile {
    fn from(writer: TimeRollingWriter) -> Self {
        Self {
            writer: Mutex::new(Writer::Time(writer)),
        }
    }
}

impl From<SizeRollingWriter> for RollingFile {
    fn from(writer: SizeRollingWriter) -> Self {
        Self {
            writer: Mutex::new(Writer::Size(writer)),
        }
    }
}

impl Append for RollingFile {
    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        self.writer()
            .as_write()
            .write_all(bytes)
            .map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        self.writer()
            .as_write()
            .flush()
            .map_err(Error::from_io_error)
    }
}

impl Drop for RollingFile {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = writer.as_write().flush() {
            eprintln!("failed to flush rolling file on drop: {err}");
        }
    }
}
