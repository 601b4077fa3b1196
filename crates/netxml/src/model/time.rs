//! Capture timestamps.

use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// ctime-style layout Kismet writes, e.g. `Thu May  7 08:23:32 2015`.
pub const KISMET_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A wall-clock capture time without zone information.
///
/// Accepts the Kismet layout, RFC 3339, or integer Unix seconds. Always
/// displays in the Kismet layout, so values hold whole seconds only and any
/// fraction is dropped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized timestamp {0:?}")]
pub struct TimestampParseError(pub String);

impl Timestamp {
    pub fn new(value: NaiveDateTime) -> Self {
        Self(value.with_nanosecond(0).unwrap_or(value))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Seconds since the Unix epoch, treating the value as UTC.
    pub fn unix_seconds(&self) -> i64 {
        self.0.and_utc().timestamp()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::new(value)
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, KISMET_TIME_FORMAT) {
            return Ok(Self(value));
        }
        if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::new(value.naive_utc()));
        }
        if let Ok(secs) = trimmed.parse::<i64>() {
            if let Some(value) = DateTime::from_timestamp(secs, 0) {
                return Ok(Self(value.naive_utc()));
            }
        }

        Err(TimestampParseError(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KISMET_TIME_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
