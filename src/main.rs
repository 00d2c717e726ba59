//! TutorHub auth gateway binary.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tutorhub::config::Config;
use tutorhub::gateway;

#[derive(Parser)]
#[command(
    name = "tutorhub",
    version,
    about = "Session-authenticated gateway for the TutorHub Q&A backend"
)]
struct Cli {
    /// Bind address (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    gateway::run_gateway(&host, port, config).await
}
