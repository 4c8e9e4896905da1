//! Sink chain resolver binary
//!
//! Loads a network description and resolves each listed sink to its
//! terminal destination.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tnt_chain::{Config, Network, Resolution};

/// Resolve sink chains in a tank network.
#[derive(Parser, Debug)]
#[command(name = "tnt-resolve", about = "Resolve sink chains in a tank network", version)]
struct Cli {
    /// Path to the network description (JSON).
    network: PathBuf,

    /// Path to the chain configuration file (TOML).
    #[arg(long, short = 'c', env = "TNT_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum sink chain length; overrides the configuration.
    #[arg(long)]
    max_chain_length: Option<usize>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::from_env()?,
    };
    let max_chain_length = cli
        .max_chain_length
        .unwrap_or(config.tnt.max_sink_chain_length);

    let network = Network::from_file(&cli.network)
        .with_context(|| format!("Failed to load network from {}", cli.network.display()))?;
    tracing::info!(
        tanks = network.tanks.len(),
        requests = network.resolve.len(),
        max_chain_length,
        "Resolving sink chains"
    );

    let results = network.resolve_all(max_chain_length);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    for (request, resolution) in &results {
        match resolution {
            Resolution::Chain(chain) => println!("{}: {}", request.sink, chain),
            Resolution::Error(err) => println!("{}: error: {}", request.sink, err),
        }
    }
    Ok(())
}
