//! `tmi-stats`: collect and review T-Mobile Home Internet gateway statistics.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `get` | Fetch and print one gateway sample |
//! | `init` | Create the database and a default config file |
//! | `watch` | Store every stabilized sample until stopped |
//! | `speedtest` | Run and store an Ookla speed test |
//! | `note` / `span` | Annotate the timeline |
//! | `last` | The most recent band rows |
//! | `notes` | List notes with span ends |
//! | `range` | Samples and speed tests in a time range |
//! | `export` | Band rows as CSV |
//!
//! # Environment Variables
//!
//! - `TMI_GATEWAY_HOST`: gateway host, same as `--host`
//! - `TMI_STATS_DB`: database file, same as `--database`
//! - `RUST_LOG`: log filter when neither `-v` nor `-q` is given

mod cli;
mod commands;
mod config;
mod format;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tmi_store::NoteKind;

use crate::cli::{Cli, Commands};
use crate::config::{Config, default_config_path};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("tmi_stats=debug,tmi_core=debug,tmi_store=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Get => commands::cmd_get(&config).await?,
        Commands::Init => commands::cmd_init(&config, &config_path)?,
        Commands::Watch { count } => commands::cmd_watch(&config, count).await?,
        Commands::Speedtest { last } => {
            commands::cmd_speedtest(&config, last, cli.quiet).await?
        }
        Commands::Note { text } => commands::cmd_note(&config, NoteKind::Note, &text)?,
        Commands::Span { text } => commands::cmd_note(&config, NoteKind::SpanStart, &text)?,
        Commands::Last { count, json } => commands::cmd_last(&config, count, json)?,
        Commands::Notes { json } => commands::cmd_notes(&config, json)?,
        Commands::Range { range, json } => commands::cmd_range(&config, &range, json)?,
        Commands::Export { range, output } => {
            commands::cmd_export(&config, &range, output.as_deref())?
        }
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().context("Failed to load default config")?,
    };

    if let Some(host) = &cli.host {
        config.gateway.host = host.clone();
    }
    if let Some(database) = &cli.database {
        config.storage.path = database.clone();
    }

    config.validate()?;
    Ok(config)
}
