//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use time::OffsetDateTime;

use tmi_core::GatewayClient;
use tmi_store::{RangeQuery, Store};

use crate::cli::RangeArgs;
use crate::config::Config;
use crate::format::parse_time;

/// Open (creating if needed) the configured database.
pub fn open_store(config: &Config) -> Result<Store> {
    let path = &config.storage.path;
    Store::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Build a client for the configured gateway.
pub fn gateway_client(config: &Config) -> Result<GatewayClient> {
    Ok(GatewayClient::with_timeout(
        &config.gateway.host,
        config.gateway.timeout(),
    )?)
}

/// Turn `--since`/`--until` into a query. A missing end means now.
pub fn range_query(args: &RangeArgs) -> Result<RangeQuery> {
    let mut query = RangeQuery::new();
    if let Some(since) = &args.since {
        query = query.since(parse_time(since)?);
    }
    let until = match &args.until {
        Some(until) => parse_time(until)?,
        None => OffsetDateTime::now_utc(),
    };
    query = query.until(until);

    if let (Some(since), Some(until)) = (query.since, query.until) {
        anyhow::ensure!(since <= until, "--since must not be later than --until");
    }
    Ok(query)
}

/// Write output to file or stdout
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
