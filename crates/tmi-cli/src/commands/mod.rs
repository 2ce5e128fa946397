//! Command implementations for the CLI.

mod gateway;
mod notes;
mod query;
mod speedtest;
mod watch;

pub use gateway::{cmd_get, cmd_init};
pub use notes::{cmd_note, cmd_notes};
pub use query::{cmd_export, cmd_last, cmd_range};
pub use speedtest::cmd_speedtest;
pub use watch::cmd_watch;
