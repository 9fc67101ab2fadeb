//! Configuration module for the swap executor
//!
//! This module handles configuration loading from TOML files and
//! environment variables, and provides structured configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger RPC node
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Quote / routing service
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Bundle relay
    #[serde(default)]
    pub relay: RelayConfig,

    /// Wallet configuration
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Retry bounds and delays for every loop in the pipeline
    #[serde(default)]
    pub retry: RetryConfig,

    /// Priority fee estimation
    #[serde(default)]
    pub fees: FeeConfig,

    /// Defaults for swap requests issued from the command line
    #[serde(default)]
    pub swap: SwapDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base URL of the Jupiter v6 API
    #[serde(default = "default_jupiter_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    /// Ask the router to wrap/unwrap native SOL
    #[serde(default = "default_true")]
    pub wrap_and_unwrap_sol: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Jito block-engine bundles endpoint
    #[serde(default = "default_jito_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    /// Tip paid to the relay in lamports (0 disables the tip transaction)
    #[serde(default = "default_jito_tip")]
    pub tip_lamports: u64,

    /// Tip accounts, one is picked at random per bundle
    #[serde(default = "default_tip_accounts")]
    pub tip_accounts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to keypair file (JSON byte array or raw 64 bytes)
    #[serde(default)]
    pub keypair_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Simulation attempts with lookup tables attached
    #[serde(default = "default_simulation_attempts")]
    pub simulation_max_attempts: u32,

    /// Simulation attempts on the no-lookup-table fallback
    #[serde(default = "default_fallback_simulation_attempts")]
    pub fallback_simulation_max_attempts: u32,

    /// Delay between simulation attempts in milliseconds
    #[serde(default = "default_simulation_delay_ms")]
    pub simulation_retry_delay_ms: u64,

    /// Bundle status polls before an attempt is abandoned
    #[serde(default = "default_status_polls")]
    pub bundle_status_polls: u32,

    /// Wait before each bundle status poll in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub bundle_poll_interval_ms: u64,

    /// Delay between outer attempts in milliseconds
    #[serde(default = "default_outer_delay_ms")]
    pub outer_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Number of most recent fee observations to average
    #[serde(default = "default_fee_sample_size")]
    pub sample_size: usize,

    /// Fee used when the node reports no observations (micro-lamports)
    #[serde(default = "default_priority_fee")]
    pub default_micro_lamports: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapDefaults {
    #[serde(default = "default_slippage")]
    pub slippage_bps: u16,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

// Default value functions
fn default_rpc_url() -> String { "https://api.mainnet-beta.solana.com".to_string() }
fn default_jupiter_url() -> String { "https://quote-api.jup.ag/v6".to_string() }
fn default_jito_url() -> String { "https://mainnet.block-engine.jito.wtf/api/v1/bundles".to_string() }
fn default_rpc_timeout() -> u64 { 30 }
fn default_http_timeout() -> u64 { 10 }
fn default_true() -> bool { true }
fn default_jito_tip() -> u64 { 10_000 }
fn default_simulation_attempts() -> u32 { 5 }
fn default_fallback_simulation_attempts() -> u32 { 3 }
fn default_simulation_delay_ms() -> u64 { 1_000 }
fn default_status_polls() -> u32 { 3 }
fn default_poll_interval_ms() -> u64 { 15_000 }
fn default_outer_delay_ms() -> u64 { 2_000 }
fn default_fee_sample_size() -> usize { 150 }
fn default_priority_fee() -> u64 { 10_000 }
fn default_slippage() -> u16 { 100 }
fn default_max_retries() -> u32 { 5 }

fn default_tip_accounts() -> Vec<String> {
    [
        "96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5",
        "HFqU5x63VTqvQss8hp11i4wVV8bD44PvwucfZ2bU7gRe",
        "Cw8CFyM9FkoMi7K7Crf6HNQqf4uEMzpKw6QNghXLvLkY",
        "ADaUMid9yfUytqMBgopwjb2DTLSokTSzL1zt6iGPaS49",
        "DfXygSm4jCyNCybVYYK6DwvWqjKee8pbDmJGcLWNDXjh",
        "ADuUkR4vqLUMWXxW9gh6D6L8pMSawimctcNZ5pGwDcEt",
        "DttWaMuVvTiduZRnguLF7jNxTgiMBZ1hyAumKUiL2KRL",
        "3AVi9Tg9Uo68tJfuvoKvqKNWKkC5wPdSSdeBnizKZ6jT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_secs: default_rpc_timeout(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_jupiter_url(),
            timeout_secs: default_http_timeout(),
            wrap_and_unwrap_sol: default_true(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_jito_url(),
            timeout_secs: default_http_timeout(),
            tip_lamports: default_jito_tip(),
            tip_accounts: default_tip_accounts(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            simulation_max_attempts: default_simulation_attempts(),
            fallback_simulation_max_attempts: default_fallback_simulation_attempts(),
            simulation_retry_delay_ms: default_simulation_delay_ms(),
            bundle_status_polls: default_status_polls(),
            bundle_poll_interval_ms: default_poll_interval_ms(),
            outer_retry_delay_ms: default_outer_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn simulation_retry_delay(&self) -> Duration {
        Duration::from_millis(self.simulation_retry_delay_ms)
    }

    pub fn bundle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.bundle_poll_interval_ms)
    }

    pub fn outer_retry_delay(&self) -> Duration {
        Duration::from_millis(self.outer_retry_delay_ms)
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            sample_size: default_fee_sample_size(),
            default_micro_lamports: default_priority_fee(),
        }
    }
}

impl Default for SwapDefaults {
    fn default() -> Self {
        Self {
            slippage_bps: default_slippage(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            routing: RoutingConfig::default(),
            relay: RelayConfig::default(),
            wallet: WalletConfig::default(),
            retry: RetryConfig::default(),
            fees: FeeConfig::default(),
            swap: SwapDefaults::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with `.env` and environment variable overrides
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a config file
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SOLANA_RPC_URL") {
            self.rpc.url = url;
        }
        if let Ok(url) = std::env::var("JUPITER_API_URL") {
            self.routing.base_url = url;
        }
        if let Ok(url) = std::env::var("JITO_BUNDLE_URL") {
            self.relay.url = url;
        }
    }

    /// Reject settings that would make a retry loop unbounded or empty
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.retry.simulation_max_attempts == 0 {
            anyhow::bail!("retry.simulation_max_attempts must be at least 1");
        }
        if self.retry.fallback_simulation_max_attempts == 0 {
            anyhow::bail!("retry.fallback_simulation_max_attempts must be at least 1");
        }
        if self.retry.bundle_status_polls == 0 {
            anyhow::bail!("retry.bundle_status_polls must be at least 1");
        }
        if self.fees.sample_size == 0 {
            anyhow::bail!("fees.sample_size must be at least 1");
        }
        if self.relay.tip_lamports > 0 && self.relay.tip_accounts.is_empty() {
            anyhow::bail!("relay.tip_accounts is empty but relay.tip_lamports is set");
        }
        Ok(())
    }
}
