//! themis - generate an image through a themisd relay

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use themis::client::{GeneratorSession, RelayClient, SessionState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Themis image generation client
#[derive(Parser, Debug)]
#[command(name = "themis", version, about = "Generate an image from a text prompt")]
struct Args {
    /// Relay server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:3001", env = "THEMIS_SERVER")]
    server: String,

    /// Write the decoded image to this file instead of printing the data URI
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text prompt
    #[arg(required = true)]
    prompt: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "themis=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let prompt = args.prompt.join(" ");

    let session = GeneratorSession::new(RelayClient::new(&args.server));
    let state = session.submit(&prompt).await?;

    match state {
        SessionState::Success(image) => match args.output {
            Some(path) => {
                let bytes = image.decode().context("relay returned invalid base64")?;
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("Wrote {} bytes to {}", bytes.len(), path.display());
                println!("{} ({})", path.display(), image.media_type());
            }
            None => println!("{}", image),
        },
        SessionState::Error(message) => bail!(message),
        SessionState::Idle | SessionState::Busy => bail!("generation did not complete"),
    }

    Ok(())
}
