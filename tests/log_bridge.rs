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
use std::sync::Mutex;

use proof::Append;
use proof::Error;
use proof::Options;

#[derive(Debug, Default)]
struct Console(Mutex<Vec<u8>>);

impl Append for Console {
    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }
}

#[test]
fn test_log_crate_records_are_forwarded() {
    // nothing is installed yet, so this is dropped silently
    log::info!("before apply");

    let console = Arc::new(Console::default());
    let sink: Arc<dyn Append> = console.clone();
    Options::new().encoding("json").console_sink(sink).apply();

    log::info!(target: "billing", "charged {} cents", 42);
    log::trace!("traced");

    let text = String::from_utf8(console.0.lock().unwrap().clone()).unwrap();
    let lines = text
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(lines.len(), 2, "{text}");
    assert_eq!(lines[0]["msg"], "charged 42 cents");
    assert_eq!(lines[0]["logger"], "billing");
    assert_eq!(lines[1]["msg"], "traced");
    assert_eq!(lines[1]["level"], "debug");

    // a later assembly keeps the bridge in place
    let console = Arc::new(Console::default());
    let sink: Arc<dyn Append> = console.clone();
    Options::new().console_sink(sink).apply();
    log::warn!("after reassembly");
    let text = String::from_utf8(console.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("after reassembly"), "{text}");
}
