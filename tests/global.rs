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
use proof::logger::try_default_logger;

#[derive(Debug, Default)]
struct Console {
    buf: Mutex<Vec<u8>>,
    flushes: Mutex<usize>,
}

impl Console {
    fn text(&self) -> String {
        String::from_utf8(self.buf.lock().unwrap().clone()).unwrap()
    }
}

impl Append for Console {
    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        self.buf.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

// one test per binary: the default logger is process-wide
#[test]
fn test_default_logger_lifecycle() {
    assert!(try_default_logger().is_none());

    let first = Arc::new(Console::default());
    let sink: Arc<dyn Append> = first.clone();
    let handle = Options::new().caller(true).console_sink(sink).apply();
    assert!(Arc::ptr_eq(&handle, &try_default_logger().unwrap()));

    let line = line!() + 1;
    proof::info("first pipeline", &[proof::string("k", "v")]);
    proof::infof!("{} pipeline via macro", "first");
    proof::debugf(format_args!("answer is {}", 42));

    let text = first.text();
    assert!(text.contains("\tinfo\t"), "{text}");
    assert!(text.contains(&format!("{}:{line}\tfirst pipeline\t", file!())), "{text}");
    assert!(text.contains(r#""k":"v""#), "{text}");
    assert!(text.contains("first pipeline via macro"), "{text}");
    assert!(text.contains("\tdebug\t"), "{text}");
    assert!(text.contains("answer is 42"), "{text}");

    // reassembly replaces the pipeline and flushes the old one
    let second = Arc::new(Console::default());
    let sink: Arc<dyn Append> = second.clone();
    Options::new().console_sink(sink).apply();
    assert_eq!(*first.flushes.lock().unwrap(), 1);

    proof::error("second pipeline", &[]);
    assert!(!first.text().contains("second pipeline"));
    assert!(second.text().contains("\terror\tsecond pipeline"));

    proof::flush().unwrap();
    assert_eq!(*second.flushes.lock().unwrap(), 1);

    // the explicit handle keeps working after it is replaced
    handle.warn("through the old handle", &[]);
    assert!(first.text().contains("through the old handle"));
}
