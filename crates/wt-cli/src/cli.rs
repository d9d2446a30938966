//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Workspace start/stop timer.
///
/// Accumulates the time between start and stop events and shows the running
/// total, persisting the timer in a small workspace state database.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the timer.
    Start,

    /// Stop the timer.
    Stop,

    /// Discard all recorded time.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Stop the timer if it is running, start it otherwise.
    Toggle,

    /// Show the elapsed time.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Keep redrawing the elapsed time until interrupted.
    Watch {
        /// Redraw interval in milliseconds (defaults to `refresh_interval_ms`).
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many redraws.
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Inspect or clear the workspace state store.
    #[command(subcommand)]
    Debug(DebugAction),
}

/// Debug operations on the raw workspace state store.
#[derive(Debug, Subcommand)]
pub enum DebugAction {
    /// Print every stored key and value.
    ShowStorage,

    /// Delete every stored key.
    ClearStorage {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}
