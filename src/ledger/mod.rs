//! Ledger RPC collaborator
//!
//! Everything the swap pipeline reads from the chain goes through
//! [`LedgerClient`]; [`SolanaLedger`] is the JSON-RPC implementation.

use crate::errors::SwapError;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::config::RpcSimulateTransactionConfig;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Mint;
use std::sync::Arc;
use std::time::Duration;

const ENDPOINT: &str = "ledger";

/// Result of a node-side transaction simulation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResponse {
    /// Transaction error rendered as text, `None` on success
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

/// One observed prioritisation fee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrioritizationFeeSample {
    pub slot: u64,
    pub micro_lamports: u64,
}

/// Chain access used by the swap pipeline
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Raw account data, `None` when the account does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, SwapError>;

    /// Decimal precision of an SPL mint
    async fn get_mint_decimals(&self, mint: &Pubkey) -> Result<u8, SwapError> {
        let data = self
            .get_account_data(mint)
            .await?
            .ok_or_else(|| SwapError::transport(ENDPOINT, format!("mint account {} not found", mint)))?;
        decode_mint_decimals(&data)
            .ok_or_else(|| SwapError::transport(ENDPOINT, format!("account {} is not an SPL mint", mint)))
    }

    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> Result<Hash, SwapError>;

    /// Simulate without signature verification, replacing the blockhash
    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationResponse, SwapError>;

    async fn get_recent_prioritization_fees(
        &self,
    ) -> Result<Vec<PrioritizationFeeSample>, SwapError>;
}

/// Read `decimals` from SPL mint account data
///
/// Token-2022 mints carry extensions after the base layout, so only the
/// leading `Mint::LEN` bytes are unpacked.
pub fn decode_mint_decimals(data: &[u8]) -> Option<u8> {
    if data.len() < Mint::LEN {
        return None;
    }
    Mint::unpack_from_slice(&data[..Mint::LEN])
        .ok()
        .map(|mint| mint.decimals)
}

/// [`LedgerClient`] backed by a Solana JSON-RPC node
pub struct SolanaLedger {
    rpc: Arc<RpcClient>,
}

impl SolanaLedger {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_timeout_and_commitment(
                url.to_string(),
                timeout,
                CommitmentConfig::confirmed(),
            )),
        }
    }

    pub fn from_client(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

impl std::fmt::Debug for SolanaLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaLedger")
            .field("url", &self.rpc.url())
            .finish()
    }
}

#[async_trait]
impl LedgerClient for SolanaLedger {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, SwapError> {
        let response = self
            .rpc
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, e))?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> Result<Hash, SwapError> {
        let (blockhash, _last_valid_height) = self
            .rpc
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, e))?;
        Ok(blockhash)
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationResponse, SwapError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::confirmed()),
            ..Default::default()
        };

        let result = self
            .rpc
            .simulate_transaction_with_config(transaction, config)
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, e))?
            .value;

        Ok(SimulationResponse {
            err: result.err.map(|e| format!("{:?}", e)),
            logs: result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }

    async fn get_recent_prioritization_fees(
        &self,
    ) -> Result<Vec<PrioritizationFeeSample>, SwapError> {
        let fees = self
            .rpc
            .get_recent_prioritization_fees(&[])
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, e))?;

        Ok(fees
            .into_iter()
            .map(|fee| PrioritizationFeeSample {
                slot: fee.slot,
                micro_lamports: fee.prioritization_fee,
            })
            .collect())
    }
}
