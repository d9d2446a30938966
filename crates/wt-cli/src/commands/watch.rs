//! Periodic display updater.
//!
//! Redraws the status line on a fixed tick until Ctrl-C, or until a given
//! number of redraws. The stored timer is re-read on every tick so changes
//! made by other `wt` invocations show up; this command never writes.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{MissedTickBehavior, interval};
use wt_core::{Clock, IntervalTimer};
use wt_db::Database;

use crate::Config;
use crate::display::status_line;
use crate::format::DurationFormat;
use crate::state;

/// Returns to the start of the line and erases it, so a shorter line never
/// leaves characters of the previous one behind.
const REDRAW: &str = "\r\x1b[2K";

/// Runs `wt watch`.
pub async fn run<W: Write, C: Clock>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    clock: &C,
    interval_ms: u64,
    ticks: Option<u64>,
) -> Result<()> {
    let format = DurationFormat::parse(&config.duration_format);
    let mut ticker = interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut warned = false;
    let mut drawn = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => break,
        }

        let raw = db
            .get_raw(&config.storage_key)
            .context("failed to read workspace state")?;
        let timer = state::decode_state(raw.as_deref()).unwrap_or_else(|err| {
            if !warned {
                tracing::warn!(error = %err, "ignoring malformed workspace state");
                warned = true;
            }
            IntervalTimer::stopped()
        });

        write!(writer, "{REDRAW}{}", status_line(&timer, clock.now(), &format))?;
        writer.flush()?;

        drawn += 1;
        if ticks.is_some_and(|limit| drawn >= limit) {
            break;
        }
    }

    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Utc};
    use insta::assert_snapshot;
    use wt_core::FixedClock;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn draws_requested_number_of_ticks() {
        let config = Config::default();
        let mut db = Database::open_in_memory().unwrap();
        let timer = IntervalTimer::stopped().start(ts("2025-01-01T09:00:00Z")).timer;
        state::save_timer(&mut db, &config.storage_key, &timer).unwrap();

        let clock = FixedClock(ts("2025-01-01T09:00:42Z"));
        let mut output = Vec::new();
        run(&mut output, &db, &config, &clock, 1, Some(3)).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches(REDRAW).count(), 3);
        assert_snapshot!(output.replace(REDRAW, "|"), @"|▶ 00:00:42|▶ 00:00:42|▶ 00:00:42");
    }

    #[tokio::test]
    async fn never_writes_storage() {
        let config = Config::default();
        let db = Database::open_in_memory().unwrap();
        let clock = FixedClock(ts("2025-01-01T00:00:00Z"));

        run(&mut Vec::new(), &db, &config, &clock, 1, Some(2)).await.unwrap();

        assert!(db.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_json_draws_stopped_timer() {
        let config = Config::default();
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wt.db");
        drop(Database::open(&path).unwrap());
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute(
                "INSERT INTO workspace_state (key, value, updated_at) VALUES (?1, ?2, ?3)",
                (&config.storage_key, "{truncated", "2025-01-01T00:00:00.000Z"),
            )
            .unwrap();
        let db = Database::open(&path).unwrap();
        let clock = FixedClock(ts("2025-01-01T00:00:00Z"));

        let mut output = Vec::new();
        run(&mut output, &db, &config, &clock, 1, Some(2)).await.unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap().replace(REDRAW, "|"), @"|■ 00:00:00|■ 00:00:00");
    }

    #[tokio::test]
    async fn malformed_storage_draws_stopped_timer() {
        let config = Config::default();
        let mut db = Database::open_in_memory().unwrap();
        db.set_value(&config.storage_key, &serde_json::json!([1, 2, 3]))
            .unwrap();
        let clock = FixedClock(ts("2025-01-01T00:00:00Z"));

        let mut output = Vec::new();
        run(&mut output, &db, &config, &clock, 1, Some(1)).await.unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap().replace(REDRAW, "|"), @"|■ 00:00:00");
    }

    #[tokio::test]
    async fn shorter_line_erases_previous_one() {
        let config = Config {
            duration_format: "s's'".to_string(),
            ..Config::default()
        };
        let mut db = Database::open_in_memory().unwrap();
        let timer = IntervalTimer::stopped().start(ts("2025-01-01T09:00:00Z")).timer;
        state::save_timer(&mut db, &config.storage_key, &timer).unwrap();

        let mut output = Vec::new();
        let clock = FixedClock(ts("2025-01-01T09:01:40Z"));
        run(&mut output, &db, &config, &clock, 1, Some(1)).await.unwrap();
        state::save_timer(&mut db, &config.storage_key, &IntervalTimer::stopped()).unwrap();
        run(&mut output, &db, &config, &clock, 1, Some(1)).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "\r\x1b[2K▶ 100s\n\r\x1b[2K■ 0s\n");
    }
}
