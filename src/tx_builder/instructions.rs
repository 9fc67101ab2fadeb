//! Instruction decoding and ordering
//!
//! Router instructions arrive as base-58/base64 wire records and are turned
//! into [`Instruction`]s here. The final list of a swap transaction is:
//! 1. Compute budget instructions (CU limit, CU price)
//! 2. Router setup instructions
//! 3. The swap instruction
//! 4. Optional cleanup instruction

use crate::errors::SwapError;
use crate::routing::{InstructionPayload, WireAccountMeta, WireInstruction};
use base64::prelude::*;
use solana_sdk::{
    compute_budget::{self, ComputeBudgetInstruction},
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use std::str::FromStr;

/// Runtime ceiling for a single transaction's compute unit limit
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

/// Largest instruction payload accepted from the router
const MAX_INSTRUCTION_DATA_LEN: usize = 1232;

/// Decode one wire instruction
pub fn decode_instruction(wire: &WireInstruction) -> Result<Instruction, SwapError> {
    let program_id = Pubkey::from_str(&wire.program_id).map_err(|e| {
        SwapError::decode_failed("programId", format!("{} ({})", e, wire.program_id))
    })?;

    let data = BASE64_STANDARD
        .decode(&wire.data)
        .map_err(|e| SwapError::decode_failed("data", format!("base64 decode error: {}", e)))?;

    if data.len() > MAX_INSTRUCTION_DATA_LEN {
        return Err(SwapError::decode_failed(
            "data",
            format!("instruction data too large ({} bytes)", data.len()),
        ));
    }

    let accounts = wire
        .accounts
        .iter()
        .map(decode_account)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Instruction::new_with_bytes(program_id, &data, accounts))
}

fn decode_account(wire: &WireAccountMeta) -> Result<AccountMeta, SwapError> {
    let pubkey = Pubkey::from_str(&wire.pubkey).map_err(|e| {
        SwapError::decode_failed("accounts.pubkey", format!("{} ({})", e, wire.pubkey))
    })?;

    Ok(AccountMeta {
        pubkey,
        is_signer: wire.is_signer,
        is_writable: wire.is_writable,
    })
}

/// Decode a router payload into `setup… + swap + cleanup?`
///
/// The payer is the only key this process can sign for, so any other account
/// flagged as signer makes the transaction unsignable and is rejected here.
pub fn assemble_instructions(
    payload: &InstructionPayload,
    payer: &Pubkey,
) -> Result<Vec<Instruction>, SwapError> {
    let swap = payload
        .swap_instruction
        .as_ref()
        .ok_or_else(|| SwapError::decode_failed("swapInstruction", "missing from response"))?;

    let mut instructions = Vec::with_capacity(payload.setup_instructions.len() + 2);
    for wire in &payload.setup_instructions {
        instructions.push(decode_instruction(wire)?);
    }
    instructions.push(decode_instruction(swap)?);
    if let Some(cleanup) = &payload.cleanup_instruction {
        instructions.push(decode_instruction(cleanup)?);
    }

    for ix in &instructions {
        if let Some(meta) = ix
            .accounts
            .iter()
            .find(|meta| meta.is_signer && meta.pubkey != *payer)
        {
            return Err(SwapError::decode_failed(
                "accounts.isSigner",
                format!("unexpected signer account: {}", meta.pubkey),
            ));
        }
    }

    Ok(instructions)
}

/// Prepend the compute budget to the swap instructions
///
/// `compute_units` is clamped to [`MAX_COMPUTE_UNIT_LIMIT`].
pub fn plan_swap_instructions(
    compute_units: u64,
    micro_lamports_per_unit: u64,
    swap_instructions: &[Instruction],
) -> Vec<Instruction> {
    let cu_limit = compute_units.min(MAX_COMPUTE_UNIT_LIMIT as u64) as u32;

    let mut instructions = Vec::with_capacity(swap_instructions.len() + 2);
    instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(cu_limit));
    instructions.push(ComputeBudgetInstruction::set_compute_unit_price(
        micro_lamports_per_unit,
    ));
    instructions.extend_from_slice(swap_instructions);
    instructions
}

/// Validate that compute budget instructions lead the list (debug/test only)
#[cfg(debug_assertions)]
pub fn sanity_check_ix_order(instructions: &[Instruction]) -> Result<(), SwapError> {
    let budget_count = instructions
        .iter()
        .take_while(|ix| ix.program_id == compute_budget::id())
        .count();

    if budget_count != 2 {
        return Err(SwapError::TransactionBuild(format!(
            "expected 2 leading compute budget instructions, found {}",
            budget_count
        )));
    }
    if instructions[budget_count..]
        .iter()
        .any(|ix| ix.program_id == compute_budget::id())
    {
        return Err(SwapError::TransactionBuild(
            "compute budget instruction after program instructions".to_string(),
        ));
    }
    Ok(())
}
