//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tmi-stats")]
#[command(
    author,
    version,
    about = "Collect signal statistics from a T-Mobile Home Internet gateway",
    long_about = None
)]
pub struct Cli {
    /// Gateway host name or address (overrides config)
    #[arg(long, global = true, env = "TMI_GATEWAY_HOST")]
    pub host: Option<String>,

    /// Database file (overrides config)
    #[arg(long, global = true, env = "TMI_STATS_DB")]
    pub database: Option<PathBuf>,

    /// Configuration file [default: <config dir>/tmi-stats/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Time range arguments shared by the range and export commands
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Start of the range (RFC3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// End of the range (RFC3339 or YYYY-MM-DD) [default: now]
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one sample from the gateway, print it and check that it decodes
    Get,

    /// Create the database (and a default config file if none exists)
    Init,

    /// Poll the gateway and store every stabilized sample
    Watch {
        /// Number of samples to store before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,
    },

    /// Run a speed test and store the result
    Speedtest {
        /// Show the most recent stored result instead of running a test
        #[arg(long)]
        last: bool,
    },

    /// Record a note
    Note {
        /// Note text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Start a new span; it runs until the next span starts
    Span {
        /// Span description
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show the most recent band rows
    Last {
        /// Number of band rows
        #[arg(short = 'n', long, default_value = "5")]
        count: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes and spans
    Notes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show samples and speed tests within a time range
    Range {
        #[command(flatten)]
        range: RangeArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export band rows as CSV
    Export {
        #[command(flatten)]
        range: RangeArgs,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
