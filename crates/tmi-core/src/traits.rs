//! Trait abstractions for telemetry sources.
//!
//! This module provides the [`GatewaySource`] trait that abstracts over the
//! real HTTP gateway client and the mock gateway used in tests.

use async_trait::async_trait;

use tmi_types::Stats;

use crate::error::Result;

/// Anything that can produce one decoded telemetry sample per call.
///
/// # Example
///
/// ```ignore
/// use tmi_core::{GatewaySource, Result};
///
/// async fn print_sinr<S: GatewaySource>(source: &S) -> Result<()> {
///     let stats = source.fetch_stats().await?;
///     for (generation, info) in stats.signal.iter() {
///         println!("{generation}: SINR {} dB", info.sinr);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait GatewaySource: Send + Sync {
    /// Fetch and decode a single sample. No retries.
    async fn fetch_stats(&self) -> Result<Stats>;
}

#[async_trait]
impl<S: GatewaySource + ?Sized> GatewaySource for std::sync::Arc<S> {
    async fn fetch_stats(&self) -> Result<Stats> {
        (**self).fetch_stats().await
    }
}
