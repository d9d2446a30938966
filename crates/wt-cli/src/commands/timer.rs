//! Start, stop, toggle and reset commands.
//!
//! Each command applies one transition to the stored timer, persists it and
//! prints what changed followed by the refreshed status line.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use wt_core::{Change, IntervalTimer, Transition};
use wt_db::Database;

use super::util::confirm;
use crate::Config;
use crate::display::status_line;
use crate::format::DurationFormat;
use crate::state;

/// Runs `wt start`.
pub fn start<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Change> {
    apply(writer, db, config, now, |timer| timer.start(now))
}

/// Runs `wt stop`.
pub fn stop<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Change> {
    apply(writer, db, config, now, |timer| timer.stop(now))
}

/// Runs `wt toggle`, the single "click" entry point.
pub fn toggle<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Change> {
    apply(writer, db, config, now, |timer| timer.toggle(now))
}

/// Runs `wt reset`. Returns `None` when the user declines.
pub fn reset<W: Write, R: BufRead>(
    writer: &mut W,
    input: &mut R,
    db: &mut Database,
    config: &Config,
    now: DateTime<Utc>,
    yes: bool,
) -> Result<Option<Change>> {
    if !yes && !confirm(writer, input, "Reset the timer?")? {
        writeln!(writer, "Reset cancelled")?;
        return Ok(None);
    }
    apply(writer, db, config, now, IntervalTimer::reset).map(Some)
}

fn apply<W, F>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    now: DateTime<Utc>,
    f: F,
) -> Result<Change>
where
    W: Write,
    F: FnOnce(IntervalTimer) -> Transition,
{
    let transition = state::apply(db, &config.storage_key, f)?;
    tracing::debug!(change = ?transition.change, "applied timer command");

    let format = DurationFormat::parse(&config.duration_format);
    writeln!(writer, "{}", transition.change)?;
    writeln!(writer, "{}", status_line(&transition.timer, now, &format))?;
    Ok(transition.change)
}
