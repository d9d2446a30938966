//! Status command for showing the elapsed time.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use wt_db::Database;

use crate::Config;
use crate::display::{StatusReport, status_line};
use crate::format::DurationFormat;
use crate::state;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let timer = state::load_timer(db, &config.storage_key)?;
    let format = DurationFormat::parse(&config.duration_format);

    if json {
        let report = StatusReport::new(&timer, now, &format);
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(writer, "{}", status_line(&timer, now, &format))?;
    }

    Ok(())
}
