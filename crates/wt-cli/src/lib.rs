//! Workspace timer CLI library.
//!
//! This crate provides the CLI interface for the workspace timer: command
//! entry points, configuration, persistence of the timer in the workspace
//! state store, and status display.

mod cli;
pub mod commands;
mod config;
pub mod display;
pub mod format;
pub mod state;

pub use cli::{Cli, Commands, DebugAction};
pub use config::Config;
