#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use briefloop::Config;
use briefloop::app::dispatch::dispatch;
use briefloop::cli::commands::Cli;
use clap::Parser;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_or_init()?;
    dispatch(cli, Arc::new(config)).await
}
