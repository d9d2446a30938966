//! Debug commands operating directly on the workspace state store.
//!
//! These never touch timer logic; they show or wipe whatever is stored.
//! A value whose text is not valid JSON is shown as a JSON string of that text.

use std::io::{BufRead, Write};

use anyhow::Result;
use serde_json::{Map, Value};
use wt_db::Database;

use super::util::confirm;

/// Runs `wt debug show-storage`.
pub fn show_storage<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let entries = db.entries()?;

    if entries.is_empty() {
        writeln!(writer, "Workspace storage empty")?;
        return Ok(());
    }

    let data: Map<String, Value> = entries
        .into_iter()
        .map(|entry| {
            let value = entry.value().unwrap_or_else(|err| {
                tracing::warn!(key = %entry.key, error = %err, "stored value is not JSON");
                Value::String(entry.raw.clone())
            });
            (entry.key, value)
        })
        .collect();
    writeln!(
        writer,
        "Workspace storage:\n{}",
        serde_json::to_string_pretty(&data)?
    )?;
    Ok(())
}

/// Runs `wt debug clear-storage`. Returns the number of keys removed, or
/// `None` when the user declines.
pub fn clear_storage<W: Write, R: BufRead>(
    writer: &mut W,
    input: &mut R,
    db: &mut Database,
    yes: bool,
) -> Result<Option<usize>> {
    if !yes && !confirm(writer, input, "Clear all workspace storage for wt?")? {
        writeln!(writer, "Clear cancelled")?;
        return Ok(None);
    }

    let removed = db.clear()?;
    tracing::info!(removed, "cleared workspace storage");
    writeln!(writer, "Cleared workspace storage")?;
    Ok(Some(removed))
}
