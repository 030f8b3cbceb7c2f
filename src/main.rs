//! imgd - Image generation relay daemon

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use imgd::{Config, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Image generation relay daemon
#[derive(Parser, Debug)]
#[command(name = "imgd", version, about = "Image generation relay daemon")]
struct Args {
    /// Address to bind the HTTP listener to
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgd=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let args = Args::parse();

    // Load config, CLI flags win over file and environment
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    // Create and run server
    let server = Server::new(config);
    server.run().await?;

    Ok(())
}
