use anyhow::Result;
use bloomserver_node::{run, shutdown_signal, telemetry, NodeArgs};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = NodeArgs::parse();
    telemetry::init_logging(&args.log)?;

    run(args, shutdown_signal()).await
}
