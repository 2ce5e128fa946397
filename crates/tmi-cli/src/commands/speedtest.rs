//! Speed test command.

use anyhow::Result;
use tracing::info;

use tmi_core::SpeedTestRunner;

use crate::config::Config;
use crate::format::{format_speed_test_run, format_stored_speed_test};
use crate::util::open_store;

pub async fn cmd_speedtest(config: &Config, last: bool, quiet: bool) -> Result<()> {
    let store = open_store(config)?;

    if last {
        match store.get_last_speed_test()? {
            Some(test) => print!("{}", format_stored_speed_test(&test)),
            None => println!("No speed tests recorded yet."),
        }
        return Ok(());
    }

    let runner = SpeedTestRunner::new(&config.speedtest.program);
    if !quiet {
        eprintln!("Running speed test, this usually takes under a minute...");
    }
    let run = runner.run().await?;

    store.save_speed_test(run.started, run.finished, &run.result)?;
    info!("Saved speed test started at {}", run.started);

    print!("{}", format_speed_test_run(&run));
    Ok(())
}
