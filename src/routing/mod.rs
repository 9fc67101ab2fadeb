//! Quote & route acquisition
//!
//! The router is an external service; this module only asks it for a quote
//! and for the instructions that execute that quote. Neither call is retried
//! here, the orchestrator's outer loop covers that.

pub mod jupiter;
pub mod types;

pub use jupiter::JupiterClient;
pub use types::{InstructionPayload, Quote, WireAccountMeta, WireInstruction};

use crate::errors::SwapError;
use crate::ledger::LedgerClient;
use crate::types::AssetInfo;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

/// Source of swap routes and the instructions that execute them
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Quote a swap of `amount` base units with the given slippage tolerance
    async fn quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<Quote, SwapError>;

    /// Fetch the instructions executing `quote` on behalf of `payer`
    async fn swap_instructions(
        &self,
        quote: &Quote,
        payer: &Pubkey,
    ) -> Result<InstructionPayload, SwapError>;
}

/// Look up the decimal precision of an asset
pub async fn fetch_asset_info(
    ledger: &dyn LedgerClient,
    mint: &Pubkey,
) -> Result<AssetInfo, SwapError> {
    let decimals = ledger.get_mint_decimals(mint).await?;
    Ok(AssetInfo { decimals })
}
