//! Compute-unit estimation by simulation
//!
//! A swap is simulated unsigned against a recent blockhash (the node replaces
//! it anyway). The consumed units plus a 20% buffer become the compute unit
//! limit of the real transaction.

use crate::errors::SwapError;
use crate::ledger::LedgerClient;
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    message::{v0::Message as MessageV0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Marker the runtime uses when an account would fall below rent exemption
const RENT_ERROR_MARKER: &str = "InsufficientFundsForRent";

/// Result of a bounded simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// Buffered compute unit estimate
    ComputeUnits(u64),
    /// The payer cannot fund rent; conclusive, the swap should be skipped
    InsufficientFundsForRent,
    /// Every attempt failed; carries the last failure reason
    Failed(String),
}

impl SimulationOutcome {
    /// Collapse into the error taxonomy so outcomes compose with `?`
    pub fn into_compute_units(self) -> Result<u64, SwapError> {
        match self {
            Self::ComputeUnits(units) => Ok(units),
            Self::InsufficientFundsForRent => Err(SwapError::InsufficientFundsForRent),
            Self::Failed(reason) => Err(SwapError::simulation_failed(reason)),
        }
    }
}

/// `ceil(units_consumed × 1.2)` in integer arithmetic
pub fn buffered_compute_units(units_consumed: u64) -> u64 {
    units_consumed.saturating_mul(6).div_ceil(5)
}

/// Build an unsigned V0 transaction suitable for simulation
pub fn build_simulation_transaction(
    instructions: &[Instruction],
    payer: &Pubkey,
    tables: &[AddressLookupTableAccount],
    blockhash: Hash,
) -> Result<VersionedTransaction, SwapError> {
    let message = MessageV0::try_compile(payer, instructions, tables, blockhash)
        .map_err(|e| SwapError::TransactionBuild(format!("message compile failed: {}", e)))?;
    let signers = message.header.num_required_signatures as usize;

    Ok(VersionedTransaction {
        signatures: vec![Signature::default(); signers],
        message: VersionedMessage::V0(message),
    })
}

/// Runs bounded simulation attempts against the ledger
pub struct SimulationEngine {
    ledger: Arc<dyn LedgerClient>,
    retry_delay: Duration,
}

impl SimulationEngine {
    pub fn new(ledger: Arc<dyn LedgerClient>, retry_delay: Duration) -> Self {
        Self {
            ledger,
            retry_delay,
        }
    }

    /// Simulate up to `max_attempts` times and estimate compute units
    ///
    /// Only a blockhash fetch failure is returned as `Err`; every
    /// per-attempt failure is folded into the outcome.
    pub async fn simulate(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        tables: &[AddressLookupTableAccount],
        max_attempts: u32,
    ) -> Result<SimulationOutcome, SwapError> {
        if instructions.is_empty() {
            return Ok(SimulationOutcome::Failed("no instructions".to_string()));
        }

        let blockhash = self
            .ledger
            .get_latest_blockhash(CommitmentConfig::confirmed())
            .await?;

        let mut last_reason = String::from("no simulation attempts made");
        for attempt in 1..=max_attempts {
            debug!(
                attempt,
                max_attempts,
                instructions = instructions.len(),
                lookup_tables = tables.len(),
                "Simulating transaction"
            );

            match self.attempt(instructions, payer, tables, blockhash).await {
                Ok(units_consumed) => {
                    let compute_units = buffered_compute_units(units_consumed);
                    info!(units_consumed, compute_units, "Simulation successful");
                    return Ok(SimulationOutcome::ComputeUnits(compute_units));
                }
                Err(reason) if reason.contains(RENT_ERROR_MARKER) => {
                    warn!(reason = %reason, "Simulation reports insufficient funds for rent");
                    return Ok(SimulationOutcome::InsufficientFundsForRent);
                }
                Err(reason) => {
                    warn!(attempt, max_attempts, reason = %reason, "Simulation attempt failed");
                    last_reason = reason;
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Ok(SimulationOutcome::Failed(last_reason))
    }

    async fn attempt(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        tables: &[AddressLookupTableAccount],
        blockhash: Hash,
    ) -> Result<u64, String> {
        let tx = build_simulation_transaction(instructions, payer, tables, blockhash)
            .map_err(|e| e.to_string())?;

        let response = self
            .ledger
            .simulate_transaction(&tx)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(err) = response.err {
            if !response.logs.is_empty() {
                debug!(logs = ?response.logs, "Simulation logs");
            }
            return Err(err);
        }

        response
            .units_consumed
            .ok_or_else(|| "simulation returned no units_consumed".to_string())
    }
}
