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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use jiff::Zoned;

use crate::Error;
use crate::append::file::RotationUnit;
use crate::append::file::clock::Clock;
use crate::append::file::split_path;

/// A writer that starts a new file for every elapsed [`RotationUnit`].
///
/// Given the path `logs/app.log` and daily rotation, records go to `logs/app.log.20240810`,
/// then `logs/app.log.20240811`, and so on. On unix, `logs/app.log` itself is a symlink to the
/// current file.
#[derive(Debug)]
pub struct TimeRollingWriter {
    state: State,
    writer: File,
}

impl TimeRollingWriter {
    /// Creates a new [`TimeRollingWriterBuilder`].
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>) -> TimeRollingWriterBuilder {
        TimeRollingWriterBuilder::new(path)
    }
}

impl Write for TimeRollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = self.state.clock.now();
        if self.state.should_rollover(&now) {
            self.state.refresh_writer(&now, &mut self.writer);
        }
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Builder for [`TimeRollingWriter`].
#[derive(Debug)]
pub struct TimeRollingWriterBuilder {
    path: PathBuf,
    unit: RotationUnit,
    max_age: Option<Duration>,
    clock: Clock,
}

impl TimeRollingWriterBuilder {
    /// Creates a new [`TimeRollingWriterBuilder`] for the given base path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            unit: RotationUnit::default(),
            max_age: None,
            clock: Clock::DefaultClock,
        }
    }

    /// Set the rotation period.
    #[must_use]
    pub fn unit(mut self, unit: RotationUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Delete period files whose last modification is older than `max_age`.
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    #[cfg(test)]
    fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the [`TimeRollingWriter`].
    ///
    /// # Errors
    ///
    /// Return an error if the path has no file name, or if the log directory or the current
    /// period file cannot be created.
    pub fn build(self) -> Result<TimeRollingWriter, Error> {
        let Self {
            path,
            unit,
            max_age,
            clock,
        } = self;

        let (dir, basename) = split_path(&path)?;
        fs::create_dir_all(&dir).map_err(|err| {
            Error::new("failed to create log directory")
                .with_context("path", dir.display())
                .with_source(err)
        })?;

        let now = clock.now();
        let mut state = State {
            dir,
            basename,
            current: String::new(),
            unit,
            next_boundary: unit.next_boundary(&now)?,
            max_age,
            clock,
        };
        let writer = state.open_period_file(&now)?;
        state.finish_rollover(&now);

        Ok(TimeRollingWriter { state, writer })
    }
}

#[derive(Debug)]
struct State {
    dir: PathBuf,
    basename: String,
    current: String,
    unit: RotationUnit,
    next_boundary: Zoned,
    max_age: Option<Duration>,
    clock: Clock,
}

impl State {
    fn period_filename(&self, now: &Zoned) -> String {
        format!("{}.{}", self.basename, now.strftime(self.unit.format()))
    }

    fn open_period_file(&mut self, now: &Zoned) -> Result<File, Error> {
        let filename = self.period_filename(now);
        let filepath = self.dir.join(&filename);
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&filepath)
            .map_err(|err| {
                Error::new("failed to create log file")
                    .with_context("path", filepath.display())
                    .with_source(err)
            })?;
        self.current = filename;
        Ok(file)
    }

    // housekeeping after the current file changed; failures never stop logging
    fn finish_rollover(&self, now: &Zoned) {
        if let Err(err) = self.update_link() {
            eprintln!("failed to update log symlink: {err}");
        }
        if let Some(max_age) = self.max_age {
            if let Err(err) = self.delete_expired_logs(now, max_age) {
                eprintln!("failed to delete expired logs: {err}");
            }
        }
    }

    #[cfg(unix)]
    fn update_link(&self) -> Result<(), Error> {
        let link = self.dir.join(&self.basename);
        if let Ok(metadata) = fs::symlink_metadata(&link) {
            if !metadata.file_type().is_symlink() {
                return Err(Error::new("link path is occupied by a regular file")
                    .with_context("path", link.display()));
            }
        }

        // replace the link atomically so readers never see it missing
        let tmp = self.dir.join(format!("{}.symlink_tmp", self.basename));
        let _ = fs::remove_file(&tmp);
        std::os::unix::fs::symlink(&self.current, &tmp).map_err(|err| {
            Error::new("failed to create symlink")
                .with_context("path", tmp.display())
                .with_source(err)
        })?;
        fs::rename(&tmp, &link).map_err(|err| {
            Error::new("failed to install symlink")
                .with_context("path", link.display())
                .with_source(err)
        })
    }

    #[cfg(not(unix))]
    fn update_link(&self) -> Result<(), Error> {
        Ok(())
    }

    fn delete_expired_logs(&self, now: &Zoned, max_age: Duration) -> Result<(), Error> {
        let now = std::time::SystemTime::from(now.timestamp());
        let Some(cutoff) = now.checked_sub(max_age) else {
            return Ok(());
        };

        let read_dir = fs::read_dir(&self.dir).map_err(|err| {
            Error::new("failed to read log dir")
                .with_context("path", self.dir.display())
                .with_source(err)
        })?;

        let prefix = format!("{}.", self.basename);
        for entry in read_dir {
            let Ok(entry) = entry else { continue };
            let filename = entry.file_name();
            let Some(filename) = filename.to_str() else {
                continue;
            };
            if filename == self.current {
                continue;
            }
            let Some(period) = filename.strip_prefix(&prefix) else {
                continue;
            };
            if period.is_empty() || !period.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }

            // DirEntry::metadata does not follow symlinks
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            if metadata.modified().is_ok_and(|mtime| mtime < cutoff) {
                let filepath = entry.path();
                fs::remove_file(&filepath).map_err(|err| {
                    Error::new("failed to remove expired log")
                        .with_context("path", filepath.display())
                        .with_source(err)
                })?;
            }
        }

        Ok(())
    }

    fn refresh_writer(&mut self, now: &Zoned, file: &mut File) {
        match self.unit.next_boundary(now) {
            Ok(next) => self.next_boundary = next,
            Err(err) => eprintln!("failed to compute next rotation: {err}"),
        }

        match self.open_period_file(now) {
            Ok(new_file) => {
                if let Err(err) = file.flush() {
                    eprintln!("failed to flush previous writer: {err}");
                }
                *file = new_file;
                self.finish_rollover(now);
            }
            Err(err) => eprintln!("failed to create writer for logs: {err}"),
        }
    }

    fn should_rollover(&self, now: &Zoned) -> bool {
        now.timestamp() >= self.next_boundary.timestamp()
    }
}
