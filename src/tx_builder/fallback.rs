//! Lookup-table fallback combinator
//!
//! Lookup tables returned by the router are sometimes stale or deactivated.
//! Stages that depend on them (simulation, message compilation) are run once
//! with the tables and, if that fails inconclusively, once more without.

use crate::errors::SwapError;
use crate::metrics::metrics;
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use std::future::Future;
use tracing::warn;

/// Which pass of the fallback a stage is running in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePass {
    /// First run, with every resolved table
    Primary,
    /// Second run, with no tables at all
    Fallback,
}

/// Stage names recognised by the fallback metrics
pub const STAGE_SIMULATION: &str = "simulation";
pub const STAGE_BUILD: &str = "build";

/// Run `op` with `tables`, repeating once with no tables when that can help
///
/// The retry happens only if `tables` was non-empty and the error is one a
/// different table set could change (see
/// [`SwapError::allows_lookup_table_fallback`]). The second result is
/// returned as-is.
pub async fn with_lookup_table_fallback<T, F, Fut>(
    stage: &'static str,
    tables: Vec<AddressLookupTableAccount>,
    mut op: F,
) -> Result<T, SwapError>
where
    F: FnMut(Vec<AddressLookupTableAccount>, TablePass) -> Fut,
    Fut: Future<Output = Result<T, SwapError>>,
{
    let had_tables = !tables.is_empty();

    match op(tables, TablePass::Primary).await {
        Ok(value) => Ok(value),
        Err(err) if had_tables && err.allows_lookup_table_fallback() => {
            warn!(
                stage,
                error = %err,
                "Stage failed with lookup tables, retrying without them"
            );
            match stage {
                STAGE_SIMULATION => metrics().simulation_fallbacks.inc(),
                STAGE_BUILD => metrics().build_fallbacks.inc(),
                _ => {}
            }
            op(Vec::new(), TablePass::Fallback).await
        }
        Err(err) => Err(err),
    }
}
