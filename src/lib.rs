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

//! Proof is an options-driven structured logging front end.
//!
//! # Overview
//!
//! Describe where records should go with [`Options`]: the encoding, an info file, an optional
//! error file that separates warn-and-above records, how the files rotate, and whether records
//! are mirrored to the console. [`Options::build`] assembles an explicit [`Logger`] handle;
//! [`Options::apply`] also installs it as the process-wide default logger behind the
//! package-wide functions such as [`info`] and the macros such as [`infof!`].
//!
//! # Examples
//!
//! Pass the handle around:
//!
//! ```
//! use proof::Options;
//!
//! let logger = Options::new().encoding("json").build();
//! logger.info("info level test", &[proof::with("trace", "123123123")]);
//! logger.flush().unwrap();
//! ```
//!
//! Or install it once at startup:
//!
//! ```
//! use proof::Options;
//! use proof::append::file::Division;
//!
//! let dir = tempfile::tempdir().unwrap();
//! Options::new()
//!     .division(Division::Size)
//!     .max_size(10)
//!     .info_file(dir.path().join("application.log"))
//!     .error_file(dir.path().join("application_err.log"))
//!     .apply();
//!
//! proof::debug("debug level test", &[proof::with("user_id", "123")]);
//! proof::warnf!("retrying in {}s", 5);
//! proof::flush().unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::fmt;

pub mod append;
pub mod field;
pub mod layout;
pub mod logger;
pub mod record;

#[cfg(feature = "bridge-log")]
pub mod bridge;

mod error;
mod macros;
mod options;

pub use self::append::Append;
pub use self::error::Error;
pub use self::field::Field;
pub use self::field::Value;
pub use self::field::boolean;
pub use self::field::duration;
pub use self::field::float;
pub use self::field::int;
pub use self::field::json;
pub use self::field::render;
pub use self::field::string;
pub use self::field::uint;
pub use self::field::with;
pub use self::field::with_byte_string;
pub use self::field::with_error;
pub use self::field::with_struct;
pub use self::layout::Layout;
pub use self::logger::Logger;
pub use self::options::HOST_NAME_ENV;
pub use self::options::Options;
pub use self::options::SERVICE_NAME_ENV;
pub use self::record::Level;

use self::logger::default_logger;

/// Log a message at the debug level with the default logger.
///
/// # Panics
///
/// Panics if no default logger is installed. The same holds for every package-wide function.
#[track_caller]
pub fn debug(message: &str, fields: &[Field]) {
    default_logger().debug(message, fields);
}

/// Log a message at the info level with the default logger.
#[track_caller]
pub fn info(message: &str, fields: &[Field]) {
    default_logger().info(message, fields);
}

/// Log a message at the warn level with the default logger.
#[track_caller]
pub fn warn(message: &str, fields: &[Field]) {
    default_logger().warn(message, fields);
}

/// Log a message at the error level with the default logger.
#[track_caller]
pub fn error(message: &str, fields: &[Field]) {
    default_logger().error(message, fields);
}

/// Log a message at the fatal level with the default logger, flush, then exit the process with
/// status 1.
#[track_caller]
pub fn fatal(message: &str, fields: &[Field]) -> ! {
    default_logger().fatal(message, fields)
}

/// Log a formatted message at the debug level with the default logger.
///
/// See also [`debugf!`].
#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    default_logger().debugf(args);
}

/// Log a formatted message at the info level with the default logger.
#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    default_logger().infof(args);
}

/// Log a formatted message at the warn level with the default logger.
#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    default_logger().warnf(args);
}

/// Log a formatted message at the error level with the default logger.
#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    default_logger().errorf(args);
}

/// Log a formatted message at the fatal level with the default logger, flush, then exit the
/// process with status 1.
#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    default_logger().fatalf(args)
}

/// Flush every sink of the default logger.
///
/// Call it before the process exits so that buffered records are persisted.
///
/// # Errors
///
/// Return an error carrying one source per sink that failed to flush.
pub fn flush() -> Result<(), Error> {
    default_logger().flush()
}
