//! Bundled swap executor
//!
//! Runs a single swap from the command line: validates the request, builds a
//! [`SwapEngine`] from configuration and prints the landed bundle.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use bundle_swap::config::Config;
use bundle_swap::metrics::metrics;
use bundle_swap::wallet::WalletManager;
use bundle_swap::{SwapEngine, SwapRequest};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Mint of the asset to sell
    #[arg(long, default_value = WSOL_MINT)]
    input_mint: String,

    /// Mint of the asset to buy
    #[arg(long, default_value = USDC_MINT)]
    output_mint: String,

    /// Amount of the input asset, in human units
    #[arg(long, default_value_t = 0.01)]
    amount: f64,

    /// Initial slippage tolerance in basis points (overrides config)
    #[arg(long, allow_negative_numbers = true)]
    slippage_bps: Option<i64>,

    /// Maximum number of attempts (overrides config)
    #[arg(long, allow_negative_numbers = true)]
    max_retries: Option<i64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.json_logs)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting bundle-swap");

    let config = load_config(&args.config)?;
    config.validate().context("Invalid configuration")?;

    let request = SwapRequest::new(
        &args.input_mint,
        &args.output_mint,
        args.amount,
        args.slippage_bps.unwrap_or(config.swap.slippage_bps as i64),
        args.max_retries.unwrap_or(config.swap.max_retries as i64),
    )
    .context("Invalid swap request")?;

    let wallet = load_wallet(&config)?;
    info!(wallet = %wallet.pubkey(), "Wallet loaded");

    let engine = SwapEngine::from_config(&config, wallet).context("Failed to build swap engine")?;

    info!(
        input_mint = %request.input_mint(),
        output_mint = %request.output_mint(),
        amount = request.amount(),
        slippage_bps = request.slippage_bps(),
        max_retries = request.max_retries(),
        "Starting swap"
    );

    let outcome = engine.execute_swap(&request).await;

    if args.print_metrics {
        match metrics().export_text() {
            Ok(text) => println!("{}", text),
            Err(e) => warn!(error = %e, "Failed to export metrics"),
        }
    }

    match outcome {
        Ok(Some(result)) => {
            info!(signature = %result.transaction_signature, "Swap completed successfully");
            println!("{}", serde_json::to_string_pretty(&result)?);
            println!("View on Solscan: https://solscan.io/tx/{}", result.transaction_signature);
            Ok(())
        }
        Ok(None) => {
            warn!("Swap could not be completed");
            println!("Swap could not be completed.");
            Ok(())
        }
        Err(e) => {
            error!(category = e.category(), error = %e, "Swap failed");
            Err(e.into())
        }
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_filter = if verbose {
        "bundle_swap=debug,info"
    } else {
        "bundle_swap=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::from_env())
    }
}

/// Keypair file from config wins over the environment
fn load_wallet(config: &Config) -> Result<WalletManager> {
    match &config.wallet.keypair_path {
        Some(path) => WalletManager::from_file(path).context("Failed to load wallet"),
        None => WalletManager::from_env().context("Failed to load wallet from environment"),
    }
}
