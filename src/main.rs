//! ttts - tic-tac-toe session server.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ttts::{GameServer, ServerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = load_config(&cli)?;
    let server = GameServer::bind(config).await?;
    info!(addr = %server.local_addr(), "Starting ttts");
    server.run().await?;

    Ok(())
}

#[instrument(skip_all, fields(port = cli.port))]
fn load_config(cli: &Cli) -> Result<ServerConfig> {
    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => {
            info!("No config file given, using defaults");
            ServerConfig::default()
        }
    };
    let config = config.with_port(cli.port);
    config.validate()?;
    Ok(config)
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,ttts=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
