//! The timer as kept in the workspace state store.
//!
//! The store value under the configured key wraps the timer record:
//!
//! ```json
//! { "startStopTimes": { "lastStartTime": "...", "intervals": ["start/end"] } }
//! ```
//!
//! A missing value is a stopped timer. A value that does not decode is
//! reported and replaced by a stopped timer; it is never fatal.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wt_core::{IntervalTimer, MalformedRecord, TimerRecord, Transition};
use wt_db::Database;

/// The stored workspace state value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDto {
    pub start_stop_times: TimerRecord,
}

/// Decodes stored workspace state text. `None` is a stopped timer.
///
/// Text that is not JSON, or JSON without the expected shape, is malformed.
pub fn decode_state(raw: Option<&str>) -> Result<IntervalTimer, MalformedRecord> {
    let Some(raw) = raw else {
        return Ok(IntervalTimer::stopped());
    };
    let state: StateDto = serde_json::from_str(raw).map_err(MalformedRecord::Shape)?;
    IntervalTimer::from_record(&state.start_stop_times)
}

/// Encodes a timer as a workspace state value.
pub fn encode_state(timer: &IntervalTimer) -> Result<Value> {
    let state = StateDto {
        start_stop_times: timer.to_record(),
    };
    serde_json::to_value(state).context("failed to encode timer state")
}

/// Decodes stored text, falling back to a stopped timer when it is malformed.
fn decode_or_stopped(key: &str, raw: Option<&str>) -> IntervalTimer {
    decode_state(raw).unwrap_or_else(|err| {
        tracing::warn!(key, error = %err, "ignoring malformed workspace state");
        eprintln!("Warning: stored timer is unreadable ({err}); using a stopped timer");
        IntervalTimer::stopped()
    })
}

/// Loads the timer stored under `key`.
pub fn load_timer(db: &Database, key: &str) -> Result<IntervalTimer> {
    let raw = db
        .get_raw(key)
        .with_context(|| format!("failed to read workspace state {key}"))?;
    Ok(decode_or_stopped(key, raw.as_deref()))
}

/// Stores `timer` under `key`, replacing whatever was there.
pub fn save_timer(db: &mut Database, key: &str, timer: &IntervalTimer) -> Result<()> {
    db.set_value(key, &encode_state(timer)?)
        .with_context(|| format!("failed to write workspace state {key}"))
}

/// Loads the timer, applies `f` and saves the result, all in one transaction.
pub fn apply<F>(db: &mut Database, key: &str, f: F) -> Result<Transition>
where
    F: FnOnce(IntervalTimer) -> Transition,
{
    let mut applied = None;
    db.update_value(key, |current| {
        let transition = f(decode_or_stopped(key, current.as_deref()));
        let value = encode_state(&transition.timer)?;
        applied = Some(transition);
        Ok::<_, anyhow::Error>(Some(value))
    })
    .with_context(|| format!("failed to update workspace state {key}"))?;

    applied.context("workspace state update did not run")
}
