//! Watch command implementation.
//!
//! Runs the stabilized poll loop and stores every accepted sample until the
//! requested count is reached or Ctrl+C is pressed. Fetch failures never end
//! the loop; they are logged and the next poll waits a full minimum interval.

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tmi_core::{Clock, Error as CoreError, GatewayPoller, GatewaySource};
use tmi_store::Store;

use crate::config::Config;
use crate::format::{format_signal, format_time};
use crate::util::{gateway_client, open_store};

/// Failures logged individually before going quiet.
const LOUD_FAILURES: u32 = 3;

pub async fn cmd_watch(config: &Config, count: u32) -> Result<()> {
    let store = open_store(config)?;
    let client = gateway_client(config)?;
    let poller_config = config.poller.to_poller_config();
    poller_config.validate()?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nShutting down...");
            on_ctrl_c.cancel();
        }
    });

    info!("Watching {}", client.url());
    let mut poller = GatewayPoller::new(client, poller_config).with_cancellation(cancel);
    let saved = run_watch(&mut poller, &store, count).await?;

    store.close()?;
    eprintln!("Stored {saved} samples.");
    Ok(())
}

/// Poll and store until `count` samples are saved (0 for no limit) or the
/// poller is cancelled. Returns the number saved.
pub(crate) async fn run_watch<S, C>(
    poller: &mut GatewayPoller<S, C>,
    store: &Store,
    count: u32,
) -> Result<u32>
where
    S: GatewaySource,
    C: Clock,
{
    let mut saved = 0u32;
    let mut consecutive_failures = 0u32;

    while count == 0 || saved < count {
        match poller.next_stable().await {
            Ok(stats) => {
                consecutive_failures = 0;
                let at = store.save_signal(&stats.signal)?;
                saved += 1;
                print!("{}\n{}", format_time(at), format_signal(&stats.signal));
            }
            Err(CoreError::Cancelled) => break,
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= LOUD_FAILURES {
                    warn!("Failed to poll gateway: {} (attempt {})", e, consecutive_failures);
                } else if consecutive_failures == LOUD_FAILURES + 1 {
                    error!(
                        "Failed to poll gateway {} times in a row, will continue trying silently",
                        consecutive_failures
                    );
                }

                let backoff = poller.config().min_wait;
                if let Err(CoreError::Cancelled) = poller.pause(backoff).await {
                    break;
                }
            }
        }
    }

    Ok(saved)
}
