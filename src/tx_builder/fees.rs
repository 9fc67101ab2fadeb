//! Priority fee estimation

use crate::config::FeeConfig;
use crate::errors::SwapError;
use crate::ledger::{LedgerClient, PrioritizationFeeSample};
use crate::types::PriorityFee;
use tracing::debug;

const MICRO_LAMPORTS_PER_SOL: f64 = 1e9;

/// Turn a fee price into the display-only SOL figure
pub fn micro_lamports_to_sol(micro_lamports: u64) -> f64 {
    micro_lamports as f64 / MICRO_LAMPORTS_PER_SOL
}

/// Average the most recent `sample_size` observations, rounding up
///
/// Samples may arrive in any order; they are ranked by slot first.
pub fn compute_priority_fee(
    samples: &[PrioritizationFeeSample],
    sample_size: usize,
    default_micro_lamports: u64,
) -> PriorityFee {
    if samples.is_empty() || sample_size == 0 {
        return PriorityFee {
            micro_lamports_per_unit: default_micro_lamports,
            estimated_cost_sol: micro_lamports_to_sol(default_micro_lamports),
        };
    }

    let mut ordered = samples.to_vec();
    ordered.sort_by_key(|sample| sample.slot);
    let recent = &ordered[ordered.len().saturating_sub(sample_size)..];

    let total: u128 = recent.iter().map(|s| s.micro_lamports as u128).sum();
    let count = recent.len() as u128;
    let micro_lamports = total.div_ceil(count) as u64;

    PriorityFee {
        micro_lamports_per_unit: micro_lamports,
        estimated_cost_sol: micro_lamports_to_sol(micro_lamports),
    }
}

/// Fetch recent fees from the ledger and derive a price
pub async fn estimate_priority_fee(
    ledger: &dyn LedgerClient,
    config: &FeeConfig,
) -> Result<PriorityFee, SwapError> {
    let samples = ledger.get_recent_prioritization_fees().await?;
    let fee = compute_priority_fee(&samples, config.sample_size, config.default_micro_lamports);

    debug!(
        samples = samples.len(),
        micro_lamports = fee.micro_lamports_per_unit,
        "Priority fee estimated"
    );
    Ok(fee)
}
