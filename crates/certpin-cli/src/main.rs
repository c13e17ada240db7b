//! certpin - fetch TLS peer certificates and embed them as Rust source

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use certpin_cli::{run_generate, GenerateRequest};

/// Fetch TLS peer certificates and embed them in a generated Rust file
#[derive(Parser, Debug)]
#[command(name = "certpin")]
#[command(about = "Embed TLS peer certificates as a Rust byte-string bundle", long_about = None)]
struct Cli {
    /// Module name for the generated bundle
    #[arg(short, long)]
    module: String,

    /// File to write the generated bundle into
    #[arg(short, long)]
    output: PathBuf,

    /// Declare the bundle static `pub` instead of `pub(crate)`
    #[arg(long)]
    exported: bool,

    /// Per-endpoint connect timeout in seconds
    #[arg(long, default_value = "30")]
    connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Endpoints to fetch certificates from (host or host:port)
    endpoints: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for TLS)
    rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
        .unwrap();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    run_generate(&GenerateRequest {
        module: cli.module,
        output: cli.output,
        exported: cli.exported,
        connect_timeout: Duration::from_secs(cli.connect_timeout),
        endpoints: cli.endpoints,
    })
    .await
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to initialize logging filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
