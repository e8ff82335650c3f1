//! Lumen Daemon - Main entry point
//!
//! Keeps the Hue bridge registry up to date and persists it across restarts.

mod config;
mod service;
mod state;

use anyhow::Result;
use clap::Parser;
use lumen_core::Device;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(about = "Hue bridge registry and discovery daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "lumen.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Run a single scan, print the registry, save and exit
    #[arg(long)]
    scan_once: bool,

    /// Print the persisted registry and exit
    #[arg(long)]
    list: bool,

    /// Resolve a unique identifier (e.g. "Hue|<bridge>|<light>") and exit
    #[arg(long, value_name = "UID")]
    resolve: Option<String>,

    /// Write an example configuration to --config and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Lumen v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        config::save_default_config(&args.config)?;
        println!("Wrote example configuration to {}", args.config.display());
        return Ok(());
    }

    let config = config::load_config(&args.config)?;
    let state = state::AppState::new(config).await?;

    if let Some(uid) = args.resolve {
        match state.resolve(&uid).await {
            Some(device) => println!(
                "{} -> {} [{}]",
                uid,
                device.display_name(),
                device.unique_id()
            ),
            None => println!("{}: no provider for this identifier", uid),
        }
    } else if args.list {
        print_registry(&state).await;
    } else if args.scan_once {
        info!("Running single discovery scan");
        let summary = state.scan().await;
        println!(
            "Scan: {} added, {} promoted, {} already known",
            summary.added, summary.promoted, summary.untouched
        );
        print_registry(&state).await;
        state.save().await?;
    } else {
        service::run(state).await?;
    }

    Ok(())
}

async fn print_registry(state: &state::AppState) {
    let bridges = state.hue.bridges().await;
    println!("{} bridges:", bridges.len());
    for bridge in bridges {
        let id = if bridge.id.is_empty() {
            "<unconfirmed>"
        } else {
            bridge.id.as_str()
        };
        println!(
            "  - {} ({}) at {} [{:?}]",
            id,
            bridge.friendly_name,
            bridge.ip(),
            bridge.status
        );
        for light in &bridge.devices {
            println!("    {} ({})", light.unique_id(), light.name);
            if !light.productname.is_empty() {
                println!("      Product: {}", light.productname);
            }
        }
    }
}
