//! The start/stop interval timer.
//!
//! # State Machine
//!
//! A timer is either [`Status::Stopped`] or [`Status::Running`] with the
//! instant the open segment began. Stopping closes the open segment into an
//! [`Interval`] appended to the timer's history.
//!
//! ```text
//!            start(now)
//!   Stopped ───────────▶ Running { since }
//!      ▲                      │
//!      └──────────────────────┘
//!     stop(now): push [since, now]
//! ```
//!
//! Transitions consume the timer and return a new value together with the
//! [`Change`] they made. Starting a running timer or stopping a stopped one
//! returns the timer unchanged with an "already" change; these are notices,
//! not errors. `reset` returns to the initial state from anywhere.
//!
//! Elapsed time is never stored. It is the sum of the closed intervals plus,
//! while running, the open segment measured up to a caller-supplied instant.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::interval::Interval;

/// Whether the timer has an open segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// No open segment.
    #[default]
    Stopped,
    /// An open segment began at `since`.
    Running { since: DateTime<Utc> },
}

/// What a transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Started,
    AlreadyStarted,
    Stopped,
    AlreadyStopped,
    Reset,
}

impl Change {
    /// True when the transition left the timer as it was.
    pub const fn is_noop(self) -> bool {
        matches!(self, Self::AlreadyStarted | Self::AlreadyStopped)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Started => "Timer started",
            Self::AlreadyStarted => "Timer already started",
            Self::Stopped => "Timer stopped",
            Self::AlreadyStopped => "Timer already stopped",
            Self::Reset => "Timer reset",
        };
        write!(f, "{s}")
    }
}

/// The timer after a transition, and what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Transition {
    pub timer: IntervalTimer,
    pub change: Change,
}

/// Accumulates running time as a list of closed intervals plus at most one open segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalTimer {
    status: Status,
    intervals: Vec<Interval>,
}

impl IntervalTimer {
    /// A stopped timer with no history.
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Builds a timer from its parts.
    pub const fn new(status: Status, intervals: Vec<Interval>) -> Self {
        Self { status, intervals }
    }

    pub const fn status(&self) -> Status {
        self.status
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.status, Status::Running { .. })
    }

    /// Start of the open segment, if running.
    pub const fn last_start_time(&self) -> Option<DateTime<Utc>> {
        match self.status {
            Status::Running { since } => Some(since),
            Status::Stopped => None,
        }
    }

    /// Closed intervals in the order they were recorded.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Opens a segment at `now`. No-op when already running.
    pub fn start(self, now: DateTime<Utc>) -> Transition {
        if self.is_running() {
            return Transition {
                timer: self,
                change: Change::AlreadyStarted,
            };
        }

        tracing::debug!(%now, "timer started");
        Transition {
            timer: Self {
                status: Status::Running { since: now },
                intervals: self.intervals,
            },
            change: Change::Started,
        }
    }

    /// Closes the open segment at `now`. No-op when already stopped.
    ///
    /// If `now` lies before the segment's start the interval is recorded with
    /// zero length.
    pub fn stop(self, now: DateTime<Utc>) -> Transition {
        let Status::Running { since } = self.status else {
            return Transition {
                timer: self,
                change: Change::AlreadyStopped,
            };
        };

        if now < since {
            tracing::warn!(%since, %now, "clock is behind the segment start, closing it empty");
        }

        let mut intervals = self.intervals;
        intervals.push(Interval::clamped(since, now));
        tracing::debug!(%since, %now, count = intervals.len(), "timer stopped");

        Transition {
            timer: Self {
                status: Status::Stopped,
                intervals,
            },
            change: Change::Stopped,
        }
    }

    /// Stops a running timer, starts a stopped one.
    pub fn toggle(self, now: DateTime<Utc>) -> Transition {
        if self.is_running() {
            self.stop(now)
        } else {
            self.start(now)
        }
    }

    /// Discards all history and any open segment. Always succeeds.
    pub fn reset(self) -> Transition {
        tracing::debug!(count = self.intervals.len(), "timer reset");
        Transition {
            timer: Self::stopped(),
            change: Change::Reset,
        }
    }

    /// Total length of the closed intervals, saturating at [`Duration::MAX`].
    pub fn closed_duration(&self) -> Duration {
        self.intervals.iter().fold(Duration::zero(), |total, interval| {
            total.checked_add(&interval.duration()).unwrap_or(Duration::MAX)
        })
    }

    /// Running time as of `as_of`: closed intervals plus the open segment.
    ///
    /// An `as_of` before the open segment's start counts the segment as zero.
    pub fn elapsed(&self, as_of: DateTime<Utc>) -> Duration {
        let open = match self.status {
            Status::Running { since } => (as_of - since).max(Duration::zero()),
            Status::Stopped => Duration::zero(),
        };
        self.closed_duration()
            .checked_add(&open)
            .unwrap_or(Duration::MAX)
    }
}
