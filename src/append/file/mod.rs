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

//! Appenders for writing log records to rotating files.
//!
//! # Example
//!
//!```
//! use proof::append::file::Division;
//! use proof::append::file::RollingPolicy;
//! use proof::append::file::RotationUnit;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let policy = RollingPolicy {
//!     division: Division::Time,
//!     unit: RotationUnit::Hour,
//!     max_age: 7,
//!     ..RollingPolicy::default()
//! };
//! let file = policy.build(dir.path().join("info.log")).unwrap();
//! ```

use std::num::NonZeroU64;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

pub use append::RollingFile;
pub use rotation::Division;
pub use rotation::RotationUnit;
pub use size::SizeRollingWriter;
pub use size::SizeRollingWriterBuilder;
pub use time::TimeRollingWriter;
pub use time::TimeRollingWriterBuilder;

use crate::Error;

mod append;
mod clock;
mod rotation;
mod size;
mod time;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Describes how a log file rotates. Build one sink per path with [`RollingPolicy::build`].
///
/// Zero in any of the numeric fields means "use the default": 100 MB for `max_size`, and keep
/// everything for `max_backups` and `max_age`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct RollingPolicy {
    /// Rotate by elapsed time or by file size.
    pub division: Division,
    /// The period of time rotation.
    pub unit: RotationUnit,
    /// Maximum size in megabytes before size rotation.
    pub max_size: u64,
    /// Maximum number of backups kept by size rotation.
    pub max_backups: usize,
    /// Maximum age in days of any rotated file.
    pub max_age: u64,
    /// Gzip backups of size rotation.
    pub compress: bool,
}

impl RollingPolicy {
    /// Builds the rotating file sink for `path`.
    ///
    /// # Errors
    ///
    /// Return an error if `path` names no file, or if time rotation cannot create its first
    /// file.
    pub fn build(&self, path: impl Into<PathBuf>) -> Result<RollingFile, Error> {
        let path = path.into();
        let max_age = (self.max_age > 0)
            .then(|| Duration::from_secs(self.max_age.saturating_mul(SECONDS_PER_DAY)));

        match self.division {
            Division::Time => {
                let mut builder = TimeRollingWriter::builder(path).unit(self.unit);
                if let Some(max_age) = max_age {
                    builder = builder.max_age(max_age);
                }
                builder.build().map(RollingFile::from)
            }
            Division::Size => {
                let mut builder = SizeRollingWriter::builder(path).compress(self.compress);
                let max_size = self.max_size.saturating_mul(BYTES_PER_MEGABYTE);
                if let Some(max_size) = NonZeroU64::new(max_size) {
                    builder = builder.max_file_size(max_size);
                }
                if let Some(max_backups) = NonZeroUsize::new(self.max_backups) {
                    builder = builder.max_backups(max_backups);
                }
                if let Some(max_age) = max_age {
                    builder = builder.max_age(max_age);
                }
                builder.build().map(RollingFile::from)
            }
        }
    }
}

/// Splits a log path into its directory and file name.
///
/// A bare file name lives in the current directory.
pub(crate) fn split_path(path: &Path) -> Result<(PathBuf, String), Error> {
    let basename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::new("log path must name a file").with_context("path", path.display())
        })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, basename.to_string()))
}
