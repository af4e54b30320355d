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
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use proof::Append;
use proof::Error;
use proof::Level;
use proof::Options;
use proof::append::file::Division;
use proof::append::file::RotationUnit;
use tempfile::TempDir;

#[derive(Debug, Default)]
struct Console(Mutex<Vec<u8>>);

impl Console {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Append for Console {
    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }
}

// concatenates every period file `<base>.<digits>`; the day may turn during a test
fn read_period_files(dir: &Path, base: &str) -> String {
    let prefix = format!("{base}.");
    let mut names = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .filter(|name| {
            name.strip_prefix(&prefix)
                .is_some_and(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        })
        .collect::<Vec<_>>();
    names.sort();
    names
        .iter()
        .map(|name| fs::read_to_string(dir.join(name)).unwrap())
        .collect()
}

fn json_lines(text: &str) -> Vec<serde_json::Value> {
    text.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_separated_json_files() {
    let temp_dir = TempDir::new().unwrap();
    let console = Arc::new(Console::default());
    let sink: Arc<dyn Append> = console.clone();

    let options = Options::new()
        .division(Division::Time)
        .rotation_unit(RotationUnit::Day)
        .encoding("json")
        .info_file(temp_dir.path().join("info.log"))
        .error_file(temp_dir.path().join("error.log"))
        .console_sink(sink);
    assert!(options.level_separate());

    let logger = options.build();
    let counts = logger
        .dispatches()
        .iter()
        .map(|d| d.sink_count())
        .collect::<Vec<_>>();
    assert_eq!(counts, [2, 2]);

    logger.warn("disk almost full", &[proof::with("usage", &0.93)]);
    logger.info("request served", &[proof::with("trace", "123123123")]);
    logger.flush().unwrap();

    let info = json_lines(&read_period_files(temp_dir.path(), "info.log"));
    let error = json_lines(&read_period_files(temp_dir.path(), "error.log"));
    assert_eq!(info.len(), 1);
    assert_eq!(info[0]["msg"], "request served");
    assert_eq!(info[0]["level"], "info");
    assert_eq!(info[0]["trace"], "123123123");
    assert!(info[0].get("serviceName").is_some());
    assert!(info[0].get("hostName").is_some());

    assert_eq!(error.len(), 1);
    assert_eq!(error[0]["msg"], "disk almost full");
    assert_eq!(error[0]["level"], "warn");
    assert_eq!(error[0]["usage"], 0.93);

    // the console sits in both sink lists
    let console = json_lines(&console.text());
    let messages = console.iter().map(|v| v["msg"].clone()).collect::<Vec<_>>();
    assert_eq!(messages, ["disk almost full", "request served"]);
}

#[test]
fn test_unseparated_console_keeps_every_level() {
    let temp_dir = TempDir::new().unwrap();
    let console = Arc::new(Console::default());
    let sink: Arc<dyn Append> = console.clone();

    let options = Options::new()
        .encoding("console")
        .info_file(temp_dir.path().join("info.log"))
        .console_sink(sink);
    assert!(!options.level_separate());

    let logger = options.build();
    logger.debug("debug level test", &[proof::with("user_id", "123")]);
    logger.error("error level test", &[]);
    logger.flush().unwrap();

    let file = read_period_files(temp_dir.path(), "info.log");
    for text in [console.text(), file] {
        assert!(text.contains("\tdebug\tdebug level test\t"), "{text}");
        assert!(text.contains(r#""user_id":"123""#), "{text}");
        assert!(text.contains("\terror\terror level test\t"), "{text}");
    }
}

#[test]
fn test_mute_configuration() {
    let logger = Options::new().close_console_display().build();
    assert!(!logger.dispatches().iter().any(|d| d.sink_count() > 0));

    logger.info("nobody hears this", &[]);
    logger.error("nor this", &[]);
    assert!(logger.flush().is_ok());
}

#[test]
fn test_size_division_rotates_and_compresses() {
    let temp_dir = TempDir::new().unwrap();
    let logger = Options::new()
        .division(Division::Size)
        .max_size(1)
        .max_backups(2)
        .compress(true)
        .encoding("json")
        .close_console_display()
        .info_file(temp_dir.path().join("app.log"))
        .build();

    // about 3 MB of records through a 1 MB file
    let payload = "x".repeat(1000);
    for i in 0..3000 {
        logger.info(&payload, &[proof::int("seq", i)]);
    }
    logger.flush().unwrap();

    let mut names = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, ["app.log", "app.log.1.gz", "app.log.2.gz"]);

    let current = json_lines(&fs::read_to_string(temp_dir.path().join("app.log")).unwrap());
    assert_eq!(current.last().unwrap()["seq"], 2999);
}

#[test]
fn test_min_level_drops_debug() {
    let console = Arc::new(Console::default());
    let sink: Arc<dyn Append> = console.clone();
    let logger = Options::new()
        .min_level(Level::Info)
        .console_sink(sink)
        .build();

    logger.debug("dropped", &[]);
    logger.info("kept", &[]);
    let text = console.text();
    assert!(!text.contains("dropped"));
    assert!(text.contains("kept"));
}
