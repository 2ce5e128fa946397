//! One-shot gateway and setup commands.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use tmi_types::Stats;

use crate::config::Config;
use crate::format::format_signal;
use crate::util::{gateway_client, open_store};

/// Fetch one payload, print it as-is, then check it decodes.
pub async fn cmd_get(config: &Config) -> Result<()> {
    let client = gateway_client(config)?;
    let raw = client
        .fetch_raw()
        .await
        .with_context(|| format!("Failed to fetch {}", client.url()))?;

    println!("{}", serde_json::to_string_pretty(&raw)?);

    let stats = Stats::from_value(raw).context("Gateway response is not a usable stats payload")?;
    eprint!("{}", format_signal(&stats.signal));
    Ok(())
}

/// Create the database, and write the effective config if no file exists yet.
pub fn cmd_init(config: &Config, config_path: &Path) -> Result<()> {
    let store = open_store(config)?;
    let version = store.schema_version()?.unwrap_or_default();
    store.close()?;
    println!(
        "Database ready at {} (schema version {version})",
        config.storage.path.display()
    );

    if config_path.exists() {
        info!("Keeping existing config at {}", config_path.display());
    } else {
        config.save(config_path)?;
        println!("Wrote config to {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_database_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.storage.path = dir.path().join("data").join("stats.db");

        cmd_init(&config, &config_path).unwrap();
        assert!(config.storage.path.exists());
        assert_eq!(Config::load(&config_path).unwrap(), config);

        // Second run leaves both in place
        cmd_init(&config, &config_path).unwrap();
    }
}
