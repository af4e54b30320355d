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

use proof::Options;
use proof::append::file::Division;
use proof::append::file::RotationUnit;

fn main() {
    Options::new()
        .division(Division::Time)
        .rotation_unit(RotationUnit::Day)
        .encoding("json")
        .info_file("./logs/application.log")
        .error_file("./logs/application_err.log")
        .apply();

    proof::info("info level test", &[proof::with("trace", "123123123")]);
    proof::debug("debug level test", &[proof::with("user_id", "123")]);
    proof::warnf!("asdass {}", "asd");

    if let Err(err) = proof::flush() {
        eprintln!("failed to flush logs: {err}");
    }
}
