//! Sahayak command-line interface.

mod cli;

use clap::Parser;
use cli::{Cli, dispatch};
use sahayak::{LogFormat, init_observability, init_tracing, shutdown_observability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    init_tracing(LogFormat::from_env()).map_err(anyhow::Error::msg)?;
    init_observability("sahayak", 60).map_err(anyhow::Error::msg)?;

    let result = dispatch(Cli::parse()).await;

    shutdown_observability();
    result
}
