//! Status line rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wt_core::{IntervalTimer, TimerRecord, format_timestamp};

use crate::format::DurationFormat;

/// Shown before the duration while the timer runs.
pub const RUNNING_INDICATOR: &str = "▶";
/// Shown before the duration while the timer is stopped.
pub const STOPPED_INDICATOR: &str = "■";

/// Renders `<indicator> <elapsed>` as of `as_of`.
pub fn status_line(timer: &IntervalTimer, as_of: DateTime<Utc>, format: &DurationFormat) -> String {
    let indicator = if timer.is_running() {
        RUNNING_INDICATOR
    } else {
        STOPPED_INDICATOR
    };
    format!("{indicator} {}", format.format(timer.elapsed(as_of)))
}

/// Machine-readable status, printed by `wt status --json`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub as_of: String,
    pub elapsed_ms: i64,
    pub elapsed: String,
    pub record: TimerRecord,
}

impl StatusReport {
    pub fn new(timer: &IntervalTimer, as_of: DateTime<Utc>, format: &DurationFormat) -> Self {
        let elapsed = timer.elapsed(as_of);
        Self {
            running: timer.is_running(),
            as_of: format_timestamp(as_of),
            elapsed_ms: elapsed.num_milliseconds(),
            elapsed: format.format(elapsed),
            record: timer.to_record(),
        }
    }
}
