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

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use jiff::Span;
use jiff::Zoned;

use crate::Error;

/// How log files are rotated.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Hash)]
pub enum Division {
    /// A new file per elapsed [`RotationUnit`].
    #[default]
    Time,
    /// A new file once the current one reaches the maximum size.
    Size,
}

impl Division {
    /// The name of this division mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Time => "time",
            Division::Size => "size",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Division {
    type Err = Error;

    fn from_str(s: &str) -> Result<Division, Self::Err> {
        match s {
            "time" => Ok(Division::Time),
            "size" => Ok(Division::Size),
            _ => Err(Error::new(format!("malformed division: {s:?}"))),
        }
    }
}

/// The period of time-based rotation.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Hash)]
pub enum RotationUnit {
    /// One file per minute.
    Minute,
    /// One file per hour.
    Hour,
    /// One file per day.
    #[default]
    Day,
}

impl RotationUnit {
    /// The strftime pattern of the per-period file suffix.
    pub fn format(&self) -> &'static str {
        match self {
            RotationUnit::Minute => "%Y%m%d%H%M",
            RotationUnit::Hour => "%Y%m%d%H",
            RotationUnit::Day => "%Y%m%d",
        }
    }

    /// The nominal length of one period.
    ///
    /// Informational only: rotation follows calendar boundaries from
    /// [`next_boundary`](Self::next_boundary), so a day spanning a DST change is not 24 hours.
    pub fn rotation_gap(&self) -> Duration {
        match self {
            RotationUnit::Minute => Duration::from_secs(60),
            RotationUnit::Hour => Duration::from_secs(60 * 60),
            RotationUnit::Day => Duration::from_secs(24 * 60 * 60),
        }
    }

    fn span(&self) -> Span {
        match self {
            RotationUnit::Minute => Span::new().minutes(1),
            RotationUnit::Hour => Span::new().hours(1),
            RotationUnit::Day => Span::new().days(1),
        }
    }

    /// The start of the period that follows the one containing `now`.
    pub fn next_boundary(&self, now: &Zoned) -> Result<Zoned, Error> {
        let start = match self {
            RotationUnit::Day => now.start_of_day(),
            RotationUnit::Hour => now
                .with()
                .minute(0)
                .second(0)
                .subsec_nanosecond(0)
                .build(),
            RotationUnit::Minute => now.with().second(0).subsec_nanosecond(0).build(),
        }
        .map_err(|err| Error::new("failed to truncate rotation period").with_source(err))?;

        start
            .checked_add(self.span())
            .map_err(|err| Error::new("failed to compute next rotation").with_source(err))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn zoned(s: &str) -> Zoned {
        Zoned::from_str(s).unwrap()
    }

    #[test]
    fn test_next_boundary() {
        let now = zoned("2024-08-10T17:12:52.5+08:00[+08:00]");

        assert_eq!(
            RotationUnit::Minute.next_boundary(&now).unwrap().timestamp(),
            zoned("2024-08-10T17:13:00+08:00[+08:00]").timestamp()
        );
        assert_eq!(
            RotationUnit::Hour.next_boundary(&now).unwrap().timestamp(),
            zoned("2024-08-10T18:00:00+08:00[+08:00]").timestamp()
        );
        assert_eq!(
            RotationUnit::Day.next_boundary(&now).unwrap().timestamp(),
            zoned("2024-08-11T00:00:00+08:00[+08:00]").timestamp()
        );
    }

    #[test]
    fn test_suffix_format() {
        let now = zoned("2024-08-10T17:12:52[UTC]");
        assert_eq!(now.strftime(RotationUnit::Day.format()).to_string(), "20240810");
        assert_eq!(now.strftime(RotationUnit::Hour.format()).to_string(), "2024081017");
        assert_eq!(
            now.strftime(RotationUnit::Minute.format()).to_string(),
            "202408101712"
        );
        assert_eq!(RotationUnit::default(), RotationUnit::Day);
        assert_eq!(RotationUnit::Hour.rotation_gap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_division_parse() {
        assert_eq!("size".parse::<Division>().unwrap(), Division::Size);
        assert_eq!(Division::default(), Division::Time);
        assert!("weekly".parse::<Division>().is_err());
    }
}
