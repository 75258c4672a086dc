//! themisd - prompt-to-image relay server

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use themis::{Config, Server};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Themis image relay server
#[derive(Parser, Debug)]
#[command(name = "themisd", version, about = "Relay text prompts to an image provider")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, default_value = "themis.toml")]
    config: PathBuf,

    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "themis=info,themisd=info,tower_http=debug".into());
    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let mut config = Config::load(Some(args.config.as_path()))?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    info!("Allowed origins: {:?}", config.allowed_origins);

    // Create and run server
    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}
