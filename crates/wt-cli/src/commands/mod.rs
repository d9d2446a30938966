//! CLI subcommand implementations.

pub mod debug;
pub mod status;
pub mod timer;
mod util;
pub mod watch;
