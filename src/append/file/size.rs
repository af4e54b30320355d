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
use std::num::NonZeroU64;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use std::time::SystemTime;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::Error;
use crate::append::file::clock::Clock;
use crate::append::file::split_path;

const COMPRESS_SUFFIX: &str = ".gz";

/// A writer that rotates once the current file would exceed a maximum size.
///
/// Given the path `logs/app.log`, the newest backup is `logs/app.log.1`, the one before it
/// `logs/app.log.2`, and so on. With compression enabled, backups are gzipped to
/// `logs/app.log.1.gz`.
///
/// The file is opened lazily on the first write; an existing file is appended to.
#[derive(Debug)]
pub struct SizeRollingWriter {
    state: State,
    writer: Option<File>,
}

impl SizeRollingWriter {
    /// Creates a new [`SizeRollingWriterBuilder`].
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>) -> SizeRollingWriterBuilder {
        SizeRollingWriterBuilder::new(path)
    }
}

impl Write for SizeRollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.state.max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {len} exceeds maximum file size {}",
                    self.state.max_size
                ),
            ));
        }

        let mut file = match self.writer.take() {
            Some(file) if self.state.current_filesize + len <= self.state.max_size => file,
            Some(mut file) => {
                file.flush()?;
                drop(file);
                self.state.rotate()?
            }
            None => self.state.open_existing_or_new(len)?,
        };

        let result = file
            .write(buf)
            .inspect(|&n| self.state.current_filesize += n as u64);
        self.writer = Some(file);
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Builder for [`SizeRollingWriter`].
#[derive(Debug)]
pub struct SizeRollingWriterBuilder {
    path: PathBuf,
    max_size: NonZeroU64,
    max_backups: Option<NonZeroUsize>,
    max_age: Option<Duration>,
    compress: bool,
    clock: Clock,
}

impl SizeRollingWriterBuilder {
    /// The maximum file size used unless [`max_file_size`](Self::max_file_size) is called.
    pub const DEFAULT_MAX_SIZE: NonZeroU64 = NonZeroU64::new(100 * 1024 * 1024).unwrap();

    /// Creates a new [`SizeRollingWriterBuilder`] for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: Self::DEFAULT_MAX_SIZE,
            max_backups: None,
            max_age: None,
            compress: false,
            clock: Clock::DefaultClock,
        }
    }

    /// Set the maximum size of a log file in bytes.
    #[must_use]
    pub fn max_file_size(mut self, n: NonZeroU64) -> Self {
        self.max_size = n;
        self
    }

    /// Set the maximum number of backups to keep.
    #[must_use]
    pub fn max_backups(mut self, n: NonZeroUsize) -> Self {
        self.max_backups = Some(n);
        self
    }

    /// Delete backups whose last modification is older than `max_age`.
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Gzip backups after rotation.
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Builds the [`SizeRollingWriter`].
    ///
    /// No file is touched until the first write.
    ///
    /// # Errors
    ///
    /// Return an error if the path has no file name.
    pub fn build(self) -> Result<SizeRollingWriter, Error> {
        let Self {
            path,
            max_size,
            max_backups,
            max_age,
            compress,
            clock,
        } = self;

        let (dir, basename) = split_path(&path)?;
        let state = State {
            dir,
            basename,
            path,
            max_size: max_size.get(),
            current_filesize: 0,
            max_backups,
            max_age,
            compress,
            clock,
        };
        Ok(SizeRollingWriter {
            state,
            writer: None,
        })
    }
}

#[derive(Debug)]
struct Backup {
    filepath: PathBuf,
    index: usize,
    compressed: bool,
    modified: Option<SystemTime>,
}

#[derive(Debug)]
struct State {
    dir: PathBuf,
    basename: String,
    path: PathBuf,
    max_size: u64,
    current_filesize: u64,
    max_backups: Option<NonZeroUsize>,
    max_age: Option<Duration>,
    compress: bool,
    clock: Clock,
}

impl State {
    fn open_existing_or_new(&mut self, len: u64) -> io::Result<File> {
        match fs::metadata(&self.path) {
            Ok(metadata) if metadata.len() + len <= self.max_size => {
                let file = OpenOptions::new().append(true).open(&self.path)?;
                self.current_filesize = metadata.len();
                Ok(file)
            }
            Ok(_) => self.rotate(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => self.open_new(),
            Err(err) => Err(err),
        }
    }

    fn open_new(&mut self) -> io::Result<File> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        self.current_filesize = 0;
        Ok(file)
    }

    fn backup_path(&self, index: usize, compressed: bool) -> PathBuf {
        let suffix = if compressed { COMPRESS_SUFFIX } else { "" };
        self.dir
            .join(format!("{}.{index}{suffix}", self.basename))
    }

    fn rotate(&mut self) -> io::Result<File> {
        if fs::exists(&self.path)? {
            let mut backups = self.list_backups()?;
            // shift the oldest first so no rename overwrites a newer backup
            backups.sort_by(|a, b| b.index.cmp(&a.index));
            for backup in &backups {
                fs::rename(
                    &backup.filepath,
                    self.backup_path(backup.index + 1, backup.compressed),
                )?;
            }

            let newest = self.backup_path(1, false);
            fs::rename(&self.path, &newest)?;
            if self.compress {
                if let Err(err) = compress_file(&newest, &self.backup_path(1, true)) {
                    eprintln!("failed to compress log backup: {err}");
                }
            }
        }

        if let Err(err) = self.delete_stale_backups() {
            eprintln!("failed to delete stale backups: {err}");
        }

        self.open_new()
    }

    fn list_backups(&self) -> io::Result<Vec<Backup>> {
        let prefix = format!("{}.", self.basename);
        let backups = fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let metadata = entry.metadata().ok()?;
                // the writer only creates files, not directories or symlinks
                if !metadata.is_file() {
                    return None;
                }

                let filename = entry.file_name();
                let filename = filename.to_str()?.strip_prefix(&prefix)?;
                let (index, compressed) = match filename.strip_suffix(COMPRESS_SUFFIX) {
                    Some(index) => (index, true),
                    None => (filename, false),
                };
                let index = usize::from_str(index).ok().filter(|&i| i > 0)?;

                Some(Backup {
                    filepath: entry.path(),
                    index,
                    compressed,
                    modified: metadata.modified().ok(),
                })
            })
            .collect();
        Ok(backups)
    }

    fn delete_stale_backups(&self) -> Result<(), Error> {
        if self.max_backups.is_none() && self.max_age.is_none() {
            return Ok(());
        }

        let cutoff = self
            .max_age
            .and_then(|max_age| self.clock.now_system().checked_sub(max_age));
        let backups = self.list_backups().map_err(|err| {
            Error::new("failed to read log dir")
                .with_context("path", self.dir.display())
                .with_source(err)
        })?;

        for backup in backups {
            let too_many = self
                .max_backups
                .is_some_and(|n| backup.index > n.get());
            let too_old = match (cutoff, backup.modified) {
                (Some(cutoff), Some(modified)) => modified < cutoff,
                _ => false,
            };
            if too_many || too_old {
                fs::remove_file(&backup.filepath).map_err(|err| {
                    Error::new("failed to remove old log")
                        .with_context("path", backup.filepath.display())
                        .with_source(err)
                })?;
            }
        }

        Ok(())
    }
}

fn compress_file(src: &Path, dst: &Path) -> io::Result<()> {
    let mut input = File::open(src)?;
    let output = File::create(dst)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.sync_all()?;
    fs::remove_file(src)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Read;
    use std::io::Write;
    use std::num::NonZeroU64;
    use std::num::NonZeroUsize;
    use std::time::Duration;
    use std::time::SystemTime;

    use flate2::read::GzDecoder;
    use rand::Rng;
    use rand::distr::Alphanumeric;
    use tempfile::TempDir;

    use super::*;

    fn generate_record(len: usize) -> String {
        let mut rng = rand::rng();
        std::iter::repeat(())
            .map(|()| rng.sample(Alphanumeric))
            .map(char::from)
            .take(len)
            .collect()
    }

    fn list_names(dir: &TempDir) -> Vec<String> {
        let mut names = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn test_rotation_shifts_backups() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = SizeRollingWriterBuilder::new(temp_dir.path().join("app.log"))
            .max_file_size(NonZeroU64::new(1000).unwrap())
            .build()
            .unwrap();

        let mut records = vec![];
        for _ in 0..25 {
            let record = generate_record(100);
            assert_eq!(writer.write(record.as_bytes()).unwrap(), 100);
            records.push(record);
        }
        writer.flush().unwrap();

        assert_eq!(list_names(&temp_dir), ["app.log", "app.log.1", "app.log.2"]);
        let read = |name: &str| fs::read_to_string(temp_dir.path().join(name)).unwrap();
        assert_eq!(read("app.log.2"), records[0..10].concat());
        assert_eq!(read("app.log.1"), records[10..20].concat());
        assert_eq!(read("app.log"), records[20..25].concat());
        assert_eq!(writer.state.current_filesize, 500);
    }

    #[test]
    fn test_max_backups_are_retained() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = SizeRollingWriterBuilder::new(temp_dir.path().join("app.log"))
            .max_file_size(NonZeroU64::new(1000).unwrap())
            .max_backups(NonZeroUsize::new(1).unwrap())
            .build()
            .unwrap();

        for _ in 0..45 {
            writer.write_all(generate_record(100).as_bytes()).unwrap();
        }
        writer.flush().unwrap();

        assert_eq!(list_names(&temp_dir), ["app.log", "app.log.1"]);
    }

    #[test]
    fn test_backups_are_compressed() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = SizeRollingWriterBuilder::new(temp_dir.path().join("app.log"))
            .max_file_size(NonZeroU64::new(100).unwrap())
            .compress(true)
            .build()
            .unwrap();

        let first = generate_record(80);
        let second = generate_record(80);
        let third = generate_record(80);
        writer.write_all(first.as_bytes()).unwrap();
        writer.write_all(second.as_bytes()).unwrap();
        writer.write_all(third.as_bytes()).unwrap();
        writer.flush().unwrap();

        assert_eq!(
            list_names(&temp_dir),
            ["app.log", "app.log.1.gz", "app.log.2.gz"]
        );

        let mut decoder = GzDecoder::new(fs::File::open(temp_dir.path().join("app.log.2.gz")).unwrap());
        let mut content = String::new();
        decoder.read_to_string(&mut content).unwrap();
        assert_eq!(content, first);
    }

    #[test]
    fn test_existing_file_is_appended() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("app.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "earlier\n").unwrap();

        let mut writer = SizeRollingWriterBuilder::new(&path).build().unwrap();
        writer.write_all(b"later\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
        assert_eq!(writer.state.current_filesize, 14);
    }

    #[test]
    fn test_oversized_write_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = SizeRollingWriterBuilder::new(temp_dir.path().join("app.log"))
            .max_file_size(NonZeroU64::new(10).unwrap())
            .build()
            .unwrap();

        let err = writer.write(&[b'x'; 11]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        // lazily opened, so nothing was created
        assert!(list_names(&temp_dir).is_empty());
    }

    #[test]
    fn test_expired_backups_are_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let old = temp_dir.path().join("app.log.3");
        fs::File::create(&old)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(10 * 24 * 60 * 60))
            .unwrap();

        let mut writer = SizeRollingWriterBuilder::new(temp_dir.path().join("app.log"))
            .max_file_size(NonZeroU64::new(100).unwrap())
            .max_age(Duration::from_secs(7 * 24 * 60 * 60))
            .build()
            .unwrap();
        writer.write_all(generate_record(60).as_bytes()).unwrap();
        writer.write_all(generate_record(60).as_bytes()).unwrap();
        writer.flush().unwrap();

        // the stale backup was shifted to .4 and then removed by age
        assert_eq!(list_names(&temp_dir), ["app.log", "app.log.1"]);
    }
}
