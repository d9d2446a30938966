//! Shared utilities for CLI commands.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

/// Asks a yes/no question. Anything but `y`/`yes` (including end of input) is no.
pub fn confirm<W: Write, R: BufRead>(writer: &mut W, input: &mut R, question: &str) -> Result<bool> {
    write!(writer, "{question} [y/N] ")?;
    writer.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}
