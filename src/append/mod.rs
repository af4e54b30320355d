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

//! Sinks that accept encoded records.

use std::fmt;
use std::sync::Arc;

use crate::Error;

pub mod file;
mod stdio;

pub use self::file::RollingFile;
pub use self::stdio::Stdout;

/// A byte sink for encoded log records.
///
/// Each call to [`append`](Append::append) carries exactly one encoded record. Implementations
/// must not interleave concurrent records.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Write one encoded record to the sink.
    fn append(&self, bytes: &[u8]) -> Result<(), Error>;

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append + ?Sized> Append for Arc<T> {
    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        (**self).append(bytes)
    }

    fn flush(&self) -> Result<(), Error> {
        (**self).flush()
    }
}
