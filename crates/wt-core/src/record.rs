//! Persisted form of an [`IntervalTimer`].
//!
//! ```json
//! {
//!   "lastStartTime": "2025-01-01T09:00:00Z",
//!   "intervals": ["2025-01-01T07:00:00Z/2025-01-01T08:00:00Z"]
//! }
//! ```
//!
//! `lastStartTime` is present only while running. `intervals` is required.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::interval::{Interval, InvalidInterval, format_timestamp, parse_timestamp};
use crate::timer::{IntervalTimer, Status};

/// A stored record that could not be turned back into a timer.
#[derive(Debug, Error)]
pub enum MalformedRecord {
    /// The JSON does not have the record's shape (e.g. `intervals` is missing).
    #[error("malformed timer record: {0}")]
    Shape(#[source] serde_json::Error),
    /// `lastStartTime` is not an RFC 3339 timestamp.
    #[error("malformed timer record: invalid lastStartTime {value:?}")]
    LastStartTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// An entry of `intervals` is not a valid `start/end` interval.
    #[error("malformed timer record: invalid interval #{index} {value:?}")]
    Interval {
        index: usize,
        value: String,
        #[source]
        source: InvalidInterval,
    },
}

/// The serialized timer, with timestamps kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_start_time: Option<String>,
    pub intervals: Vec<String>,
}

impl TimerRecord {
    /// Reads a record out of a JSON value.
    pub fn from_json(value: &Value) -> Result<Self, MalformedRecord> {
        Self::deserialize(value).map_err(MalformedRecord::Shape)
    }
}

impl IntervalTimer {
    /// Restores a timer from its record.
    ///
    /// An empty `lastStartTime` string is read as absent.
    pub fn from_record(record: &TimerRecord) -> Result<Self, MalformedRecord> {
        let status = match record.last_start_time.as_deref() {
            None | Some("") => Status::Stopped,
            Some(value) => {
                let since =
                    parse_timestamp(value).map_err(|source| MalformedRecord::LastStartTime {
                        value: value.to_string(),
                        source,
                    })?;
                Status::Running { since }
            }
        };

        let intervals = record
            .intervals
            .iter()
            .enumerate()
            .map(|(index, value)| {
                value
                    .parse::<Interval>()
                    .map_err(|source| MalformedRecord::Interval {
                        index,
                        value: value.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(status, intervals))
    }

    /// Serializes the timer into its record.
    pub fn to_record(&self) -> TimerRecord {
        TimerRecord {
            last_start_time: self.last_start_time().map(format_timestamp),
            intervals: self.intervals().iter().map(ToString::to_string).collect(),
        }
    }
}
