//! Core domain logic for the workspace timer.
//!
//! This crate contains:
//! - Interval timer: a start/stop state machine that accumulates closed intervals
//! - Intervals: closed UTC time ranges and their ISO 8601 `start/end` text form
//! - Records: the persisted JSON shape of a timer and its parse errors
//!
//! Nothing here performs I/O. The current instant is always passed in, usually
//! read from a [`Clock`].

mod clock;
pub mod interval;
mod record;
mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use interval::{Interval, InvalidInterval, format_timestamp, parse_timestamp};
pub use record::{MalformedRecord, TimerRecord};
pub use timer::{Change, IntervalTimer, Status, Transition};
