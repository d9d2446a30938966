use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::{debug, status, timer, watch};
use wt_cli::{Cli, Commands, Config, DebugAction};
use wt_core::{Clock, SystemClock};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(wt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wt_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let clock = SystemClock;
    let mut stdout = io::stdout().lock();
    let mut stdin = io::stdin().lock();

    match command {
        Commands::Start => {
            timer::start(&mut stdout, &mut db, &config, clock.now())?;
        }
        Commands::Stop => {
            timer::stop(&mut stdout, &mut db, &config, clock.now())?;
        }
        Commands::Toggle => {
            timer::toggle(&mut stdout, &mut db, &config, clock.now())?;
        }
        Commands::Reset { yes } => {
            timer::reset(&mut stdout, &mut stdin, &mut db, &config, clock.now(), *yes)?;
        }
        Commands::Status { json } => {
            status::run(&mut stdout, &db, &config, clock.now(), *json)?;
        }
        Commands::Watch { interval_ms, ticks } => {
            let interval_ms = interval_ms.unwrap_or(config.refresh_interval_ms);
            let runtime =
                tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
            runtime.block_on(watch::run(
                &mut stdout,
                &db,
                &config,
                &clock,
                interval_ms,
                *ticks,
            ))?;
        }
        Commands::Debug(action) => match action {
            DebugAction::ShowStorage => debug::show_storage(&mut stdout, &db)?,
            DebugAction::ClearStorage { yes } => {
                debug::clear_storage(&mut stdout, &mut stdin, &mut db, *yes)?;
            }
        },
    }

    Ok(())
}
