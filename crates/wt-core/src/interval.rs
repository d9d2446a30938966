//! Closed time intervals.
//!
//! # Text Format
//!
//! An interval is written as two RFC 3339 timestamps joined by a slash
//! (ISO 8601 `start/end`), e.g. `1970-01-01T00:00:00Z/1970-01-01T04:20:00Z`.
//!
//! Parsing accepts any UTC offset and normalizes to UTC. Formatting always
//! writes UTC with a `Z` suffix and keeps sub-second digits when present, so
//! formatting then parsing yields the same instants.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use thiserror::Error;

/// Errors from parsing or constructing an [`Interval`].
#[derive(Debug, Error)]
pub enum InvalidInterval {
    /// The text has no `/` between start and end.
    #[error("expected <start>/<end>, got {0:?}")]
    MissingSeparator(String),
    /// One of the two timestamps is not valid RFC 3339.
    #[error("invalid {bound} timestamp {value:?}")]
    Timestamp {
        bound: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// The end lies before the start.
    #[error("interval ends before it starts: {start} > {end}")]
    Reversed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A completed segment of running time, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Creates an interval, rejecting an end before the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidInterval> {
        if end < start {
            return Err(InvalidInterval::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates an interval, moving `end` up to `start` if it lies before it.
    pub(crate) fn clamped(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the interval. Never negative.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )
    }
}

impl FromStr for Interval {
    type Err = InvalidInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((start, end)) = s.split_once('/') else {
            return Err(InvalidInterval::MissingSeparator(s.to_string()));
        };

        let parse = |bound: &'static str, value: &str| {
            parse_timestamp(value).map_err(|source| InvalidInterval::Timestamp {
                bound,
                value: value.to_string(),
                source,
            })
        };

        Self::new(parse("start", start)?, parse("end", end)?)
    }
}

/// Formats an instant as RFC 3339 in UTC (`Z` suffix, sub-second digits only when non-zero).
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an RFC 3339 timestamp with any offset into UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
