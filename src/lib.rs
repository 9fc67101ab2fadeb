//! Bundled swap executor for Solana
//!
//! Executes a single-asset swap end to end: quote from a routing service,
//! simulate for a compute estimate, price the transaction, sign it and land
//! it through a bundle relay, with bounded retries and escalating slippage.
//!
//! The entry point is [`swap_engine::SwapEngine::execute_swap`].

pub mod bundle;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod metrics;
pub mod observability;
pub mod routing;
pub mod structured_logging;
pub mod swap_engine;
pub mod tx_builder;
pub mod types;
pub mod validation;
pub mod wallet;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use errors::{SwapError, ValidationError};
pub use swap_engine::{escalated_slippage_bps, SwapEngine};
pub use types::{BundleReport, BundleStatus, SwapRequest, SwapResult};
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
