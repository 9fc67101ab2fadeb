//! Common types used throughout the swap pipeline

use crate::errors::ValidationError;
use crate::validation::{validate_amount, validate_mint, validate_retries, validate_slippage};
use serde::{Deserialize, Serialize, Serializer};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

/// A validated swap request
///
/// Fields are private: the only way to obtain a `SwapRequest` is through
/// [`SwapRequest::new`], so every instance has passed all four input checks.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    input_mint: Pubkey,
    output_mint: Pubkey,
    amount: f64,
    slippage_bps: u16,
    max_retries: u32,
}

impl SwapRequest {
    /// Validate raw parameters and build a request
    pub fn new(
        input_mint: &str,
        output_mint: &str,
        amount: f64,
        slippage_bps: i64,
        max_retries: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            input_mint: validate_mint(input_mint)?,
            output_mint: validate_mint(output_mint)?,
            amount: validate_amount(amount)?,
            slippage_bps: validate_slippage(slippage_bps)?,
            max_retries: validate_retries(max_retries)?,
        })
    }

    pub fn input_mint(&self) -> &Pubkey {
        &self.input_mint
    }

    pub fn output_mint(&self) -> &Pubkey {
        &self.output_mint
    }

    /// Amount in human units of the input asset
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Base slippage tolerance for the first attempt
    pub fn slippage_bps(&self) -> u16 {
        self.slippage_bps
    }

    /// Maximum number of outer attempts
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Mint metadata needed to scale human amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub decimals: u8,
}

impl AssetInfo {
    /// Scale a human amount into base units (`amount × 10^decimals`)
    pub fn to_base_units(&self, amount: f64) -> Result<u64, ValidationError> {
        let scaled = (amount * 10f64.powi(self.decimals as i32)).round();
        if !scaled.is_finite() || scaled < 1.0 || scaled > u64::MAX as f64 {
            return Err(ValidationError::AmountBelowPrecision {
                amount,
                decimals: self.decimals,
            });
        }
        Ok(scaled as u64)
    }
}

/// Priority fee chosen for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityFee {
    /// Compute-unit price in micro-lamports
    pub micro_lamports_per_unit: u64,
    /// Display-only cost estimate in SOL
    pub estimated_cost_sol: f64,
}

/// Relay-reported state of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum BundleStatus {
    /// The relay has not resolved the bundle yet
    Pending,
    /// The bundle landed on-chain
    Landed {
        #[serde(rename = "landedSlot")]
        slot: u64,
    },
    /// The relay dropped or rejected the bundle
    Failed,
}

impl BundleStatus {
    pub fn is_landed(&self) -> bool {
        matches!(self, Self::Landed { .. })
    }
}

/// Final record of a bundle's journey through the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReport {
    /// Identifier of the bundle that was being tracked when polling stopped
    pub bundle_id: String,
    #[serde(flatten)]
    pub status: BundleStatus,
    /// How many times the bundle was resubmitted after a `Failed` status
    #[serde(skip)]
    pub resubmissions: u32,
}

/// Terminal success artifact of a swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub bundle_status: BundleReport,
    #[serde(serialize_with = "serialize_display")]
    pub transaction_signature: Signature,
}

fn serialize_display<T: std::fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
