//! # bloomserver-util
//!
//! Offline maintenance for filter files: `create`, `add`, `add-words`,
//! `estimate` and `show`. Not safe against a filter file that a running
//! server or another maintenance run is using.

mod cli;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cli.log_level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    let mut stdout = std::io::stdout().lock();
    execute(&cli, &mut stdout)
}
