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

/// Log a formatted message at the debug level with the default logger.
///
/// # Examples
///
/// ```no_run
/// proof::debugf!("user {} logged in", 42);
/// ```
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::logger::default_logger().debugf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at the info level with the default logger.
///
/// # Examples
///
/// ```no_run
/// proof::infof!("listening on {}", "0.0.0.0:8080");
/// ```
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::logger::default_logger().infof(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at the warn level with the default logger.
#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::logger::default_logger().warnf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at the error level with the default logger.
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::logger::default_logger().errorf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at the fatal level with the default logger, flush, then exit the
/// process with status 1.
#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => {
        $crate::logger::default_logger().fatalf(::std::format_args!($($arg)+))
    };
}
