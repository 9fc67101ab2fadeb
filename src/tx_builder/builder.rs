//! Swap transaction assembly and signing

use super::instructions::plan_swap_instructions;
use super::output::TxBuildOutput;
use crate::errors::SwapError;
use crate::types::PriorityFee;
use crate::wallet::WalletManager;
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    hash::Hash,
    instruction::Instruction,
    message::{v0::Message as MessageV0, VersionedMessage},
    pubkey::Pubkey,
};
use tracing::debug;

/// Compile the swap, prefixed with its compute budget, into a V0 message
pub fn build_swap_message(
    instructions: &[Instruction],
    payer: &Pubkey,
    tables: &[AddressLookupTableAccount],
    blockhash: Hash,
    compute_units: u64,
    fee: &PriorityFee,
) -> Result<VersionedMessage, SwapError> {
    let final_instructions =
        plan_swap_instructions(compute_units, fee.micro_lamports_per_unit, instructions);

    #[cfg(debug_assertions)]
    super::instructions::sanity_check_ix_order(&final_instructions)?;

    debug!(
        instructions = final_instructions.len(),
        lookup_tables = tables.len(),
        "Compiling versioned transaction"
    );

    let message = MessageV0::try_compile(payer, &final_instructions, tables, blockhash)
        .map_err(|e| SwapError::TransactionBuild(e.to_string()))?;

    Ok(VersionedMessage::V0(message))
}

/// Sign a compiled message with the wallet
pub fn sign_message(
    message: VersionedMessage,
    wallet: &WalletManager,
    lookup_tables_used: usize,
) -> Result<TxBuildOutput, SwapError> {
    let tx = wallet
        .sign_message(message)
        .map_err(|e| SwapError::Signing(e.to_string()))?;
    Ok(TxBuildOutput::new(tx, lookup_tables_used))
}
