//! Test Utilities Module
//!
//! Scripted, in-memory collaborators for driving the swap pipeline without
//! a network. Every double records what it was asked so tests can assert on
//! call counts and arguments.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use crate::bundle::{Bundle, BundleRelay};
use crate::config::Config;
use crate::errors::SwapError;
use crate::ledger::{LedgerClient, PrioritizationFeeSample, SimulationResponse};
use crate::routing::{InstructionPayload, Quote, RouteProvider, WireAccountMeta, WireInstruction};
use crate::types::BundleStatus;
use async_trait::async_trait;
use base64::prelude::*;
use parking_lot::Mutex;
use solana_sdk::{
    address_lookup_table::state::{LookupTableMeta, ProgramState, LOOKUP_TABLE_META_SIZE},
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use spl_token::solana_program::{program_option::COption, program_pack::Pack};
use spl_token::state::Mint;
use std::collections::{HashMap, VecDeque};

/// Wrapped SOL mint
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
/// USDC mint
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Config with every delay shrunk to a few milliseconds and no tip
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.retry.simulation_retry_delay_ms = 1;
    config.retry.bundle_poll_interval_ms = 1;
    config.retry.outer_retry_delay_ms = 1;
    config.relay.tip_lamports = 0;
    config
}

/// Packed SPL mint account data
pub fn mint_account_data(decimals: u8) -> Vec<u8> {
    let mint = Mint {
        mint_authority: COption::None,
        supply: 1_000_000_000,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    };
    let mut data = vec![0u8; Mint::LEN];
    // Packing a well-formed, initialized mint cannot fail
    let _ = Mint::pack(mint, &mut data);
    data
}

/// Raw account data of an active address lookup table
pub fn lookup_table_data(addresses: &[Pubkey]) -> Vec<u8> {
    let state = ProgramState::LookupTable(LookupTableMeta::default());
    let mut data = bincode::serialize(&state).unwrap_or_default();
    data.resize(LOOKUP_TABLE_META_SIZE, 0);
    for address in addresses {
        data.extend_from_slice(address.as_ref());
    }
    data
}

/// Quote body with a single-hop route plan
pub fn sample_quote() -> Quote {
    let raw = serde_json::json!({
        "inputMint": WSOL_MINT,
        "inAmount": "10000000",
        "outputMint": USDC_MINT,
        "outAmount": "1523401",
        "otherAmountThreshold": "1508167",
        "slippageBps": 100,
        "routePlan": [{"swapInfo": {"ammKey": "pool"}, "percent": 100}]
    });
    Quote::from_value(raw).unwrap_or_else(|_| unreachable!("sample quote has a route plan"))
}

/// Router payload with one setup, one swap and one cleanup instruction
///
/// The swap instruction references `extra_accounts` read-only so lookup
/// tables over them have something to compress.
pub fn swap_payload(
    payer: &Pubkey,
    extra_accounts: &[Pubkey],
    table_addresses: &[Pubkey],
) -> InstructionPayload {
    let signer = WireAccountMeta {
        pubkey: payer.to_string(),
        is_signer: true,
        is_writable: true,
    };
    let mut swap_accounts = vec![signer.clone()];
    swap_accounts.extend(extra_accounts.iter().map(|key| WireAccountMeta {
        pubkey: key.to_string(),
        is_signer: false,
        is_writable: false,
    }));

    let wire = |accounts: Vec<WireAccountMeta>, data: &[u8]| WireInstruction {
        program_id: Pubkey::new_unique().to_string(),
        accounts,
        data: BASE64_STANDARD.encode(data),
    };

    InstructionPayload {
        setup_instructions: vec![wire(vec![signer.clone()], &[1])],
        swap_instruction: Some(wire(swap_accounts, &[2, 2])),
        cleanup_instruction: Some(wire(vec![signer], &[3])),
        address_lookup_table_addresses: table_addresses.iter().map(|k| k.to_string()).collect(),
        error: None,
    }
}

/// A successful simulation response
pub fn simulation_ok(units_consumed: u64) -> SimulationResponse {
    SimulationResponse {
        err: None,
        logs: vec!["Program log: ok".to_string()],
        units_consumed: Some(units_consumed),
    }
}

/// A failed simulation response carrying `err`
pub fn simulation_err(err: &str) -> SimulationResponse {
    SimulationResponse {
        err: Some(err.to_string()),
        logs: vec![format!("Program log: {}", err)],
        units_consumed: None,
    }
}

/// Record of one simulated transaction
#[derive(Debug, Clone)]
pub struct SimulatedCall {
    pub lookup_tables: usize,
    pub instructions: usize,
}

/// Scripted ledger
///
/// Simulation responses are consumed from a queue; once it is empty the
/// default response is repeated.
pub struct MockLedger {
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    blockhash: Hash,
    simulations: Mutex<VecDeque<Result<SimulationResponse, SwapError>>>,
    default_simulation: Mutex<Result<SimulationResponse, SwapError>>,
    fee_samples: Mutex<Vec<PrioritizationFeeSample>>,
    pub simulated: Mutex<Vec<SimulatedCall>>,
    pub blockhash_commitments: Mutex<Vec<CommitmentConfig>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            blockhash: Hash::new_unique(),
            simulations: Mutex::new(VecDeque::new()),
            default_simulation: Mutex::new(Ok(simulation_ok(100_000))),
            fee_samples: Mutex::new(Vec::new()),
            simulated: Mutex::new(Vec::new()),
            blockhash_commitments: Mutex::new(Vec::new()),
        }
    }

    /// Ledger knowing the wSOL (9 decimals) and USDC (6 decimals) mints
    pub fn with_default_mints() -> Self {
        let ledger = Self::new();
        ledger.set_mint(WSOL_MINT, 9);
        ledger.set_mint(USDC_MINT, 6);
        ledger
    }

    pub fn set_mint(&self, mint: &str, decimals: u8) {
        if let Ok(key) = mint.parse::<Pubkey>() {
            self.set_account(key, mint_account_data(decimals));
        }
    }

    pub fn set_account(&self, key: Pubkey, data: Vec<u8>) {
        self.accounts.lock().insert(key, data);
    }

    pub fn push_simulation(&self, response: Result<SimulationResponse, SwapError>) {
        self.simulations.lock().push_back(response);
    }

    pub fn set_default_simulation(&self, response: Result<SimulationResponse, SwapError>) {
        *self.default_simulation.lock() = response;
    }

    pub fn set_fee_samples(&self, samples: Vec<PrioritizationFeeSample>) {
        *self.fee_samples.lock() = samples;
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub fn simulation_count(&self) -> usize {
        self.simulated.lock().len()
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, SwapError> {
        Ok(self.accounts.lock().get(address).cloned())
    }

    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> Result<Hash, SwapError> {
        self.blockhash_commitments.lock().push(commitment);
        Ok(self.blockhash)
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationResponse, SwapError> {
        self.simulated.lock().push(SimulatedCall {
            lookup_tables: transaction
                .message
                .address_table_lookups()
                .map_or(0, |lookups| lookups.len()),
            instructions: transaction.message.instructions().len(),
        });

        let scripted = self.simulations.lock().pop_front();
        match scripted {
            Some(response) => response,
            None => self.default_simulation.lock().clone(),
        }
    }

    async fn get_recent_prioritization_fees(
        &self,
    ) -> Result<Vec<PrioritizationFeeSample>, SwapError> {
        Ok(self.fee_samples.lock().clone())
    }
}

/// Scripted router
pub struct MockRouter {
    quote: Mutex<Result<Quote, SwapError>>,
    payload: Mutex<Result<InstructionPayload, SwapError>>,
    pub quoted_slippage: Mutex<Vec<u16>>,
    pub quoted_amounts: Mutex<Vec<u64>>,
}

impl MockRouter {
    pub fn new(payload: InstructionPayload) -> Self {
        Self {
            quote: Mutex::new(Ok(sample_quote())),
            payload: Mutex::new(Ok(payload)),
            quoted_slippage: Mutex::new(Vec::new()),
            quoted_amounts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_quote(&self, quote: Result<Quote, SwapError>) {
        *self.quote.lock() = quote;
    }

    pub fn set_payload(&self, payload: Result<InstructionPayload, SwapError>) {
        *self.payload.lock() = payload;
    }

    pub fn slippage_history(&self) -> Vec<u16> {
        self.quoted_slippage.lock().clone()
    }
}

#[async_trait]
impl RouteProvider for MockRouter {
    async fn quote(
        &self,
        _input_mint: &Pubkey,
        _output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<Quote, SwapError> {
        self.quoted_slippage.lock().push(slippage_bps);
        self.quoted_amounts.lock().push(amount);
        self.quote.lock().clone()
    }

    async fn swap_instructions(
        &self,
        _quote: &Quote,
        _payer: &Pubkey,
    ) -> Result<InstructionPayload, SwapError> {
        self.payload.lock().clone()
    }
}

/// Scripted bundle relay
///
/// Bundle ids are `bundle-1`, `bundle-2`, … in submission order. Status
/// polls consume a queue and report `Pending` once it is exhausted.
pub struct MockRelay {
    statuses: Mutex<VecDeque<Result<BundleStatus, SwapError>>>,
    submit_error: Mutex<Option<SwapError>>,
    pub submitted: Mutex<Vec<Vec<VersionedTransaction>>>,
    pub polled_ids: Mutex<Vec<String>>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            submit_error: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            polled_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn with_statuses(statuses: Vec<BundleStatus>) -> Self {
        let relay = Self::new();
        for status in statuses {
            relay.push_status(Ok(status));
        }
        relay
    }

    pub fn push_status(&self, status: Result<BundleStatus, SwapError>) {
        self.statuses.lock().push_back(status);
    }

    pub fn fail_submissions(&self, error: SwapError) {
        *self.submit_error.lock() = Some(error);
    }

    pub fn submission_count(&self) -> usize {
        self.submitted.lock().len()
    }
}

impl Default for MockRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BundleRelay for MockRelay {
    async fn submit_bundle(&self, bundle: &Bundle) -> Result<String, SwapError> {
        if let Some(err) = self.submit_error.lock().clone() {
            return Err(err);
        }
        let mut submitted = self.submitted.lock();
        submitted.push(bundle.transactions().cloned().collect());
        Ok(format!("bundle-{}", submitted.len()))
    }

    async fn get_bundle_status(&self, bundle_id: &str) -> Result<BundleStatus, SwapError> {
        self.polled_ids.lock().push(bundle_id.to_string());
        self.statuses
            .lock()
            .pop_front()
            .unwrap_or(Ok(BundleStatus::Pending))
    }
}
