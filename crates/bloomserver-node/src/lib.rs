//! # bloomserver node
//!
//! Startup sequence:
//!
//! 1. Parse arguments (`NodeArgs`) and initialize logging
//! 2. Validate the gateway configuration and resolve the listen address
//! 3. Load the filter file; any corruption aborts startup
//! 4. Bind the listener and serve until Ctrl-C

pub mod config;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use bloomserver_filter::FilterStore;
use bloomserver_gateway::{GatewayListener, QueryGatewayService};
use tracing::{info, warn};

pub use config::{LogArgs, NodeArgs};

/// Run the node until `shutdown` resolves
pub async fn run<F>(args: NodeArgs, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let config = args.gateway_config();
    config.validate().context("invalid configuration")?;
    let address = config
        .resolve_listen_address()
        .context("invalid listen address")?;

    let filter = FilterStore::load_from_path(&args.bloom_filter_file).with_context(|| {
        format!(
            "failed to load bloom filter from {}",
            args.bloom_filter_file.display()
        )
    })?;

    let listener = GatewayListener::bind(&address).await?;
    let service = QueryGatewayService::new(config, Arc::new(filter))?;
    service.serve(listener, shutdown).await?;

    Ok(())
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl-C, shutting down"),
        Err(e) => warn!(error = %e, "could not listen for Ctrl-C, shutting down"),
    }
}
