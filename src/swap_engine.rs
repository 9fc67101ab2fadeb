//! Swap orchestration
//!
//! One call to [`SwapEngine::execute_swap`] runs up to `max_retries` outer
//! attempts. Each attempt goes through the whole pipeline from a fresh
//! quote:
//!
//! 1. asset info and base-unit scaling
//! 2. quote and swap instructions from the router
//! 3. instruction decoding and lookup table resolution
//! 4. simulation (with lookup-table fallback) for the compute limit
//! 5. priority fee and a finalized blockhash
//! 6. message compilation (with lookup-table fallback) and signing
//! 7. bundle submission and confirmation
//!
//! Attempt `k` (zero based) quotes with `ceil(base × (1 + 0.5k))` bps of
//! slippage. The only cross-attempt state is the attempt counter and the
//! last error.

use crate::bundle::{Bundle, BundleRelay, BundleSubmitter, JitoRelay, TipPolicy};
use crate::config::{Config, FeeConfig, RetryConfig};
use crate::errors::SwapError;
use crate::ledger::{LedgerClient, SolanaLedger};
use crate::metrics::{metrics, Timer};
use crate::observability::TraceContext;
use crate::routing::{fetch_asset_info, JupiterClient, RouteProvider};
use crate::structured_logging::SwapLogger;
use crate::tx_builder::{
    assemble_instructions, build_swap_message, estimate_priority_fee, fallback, resolve_lookup_tables,
    sign_message, with_lookup_table_fallback, SimulationEngine, TablePass,
};
use crate::types::{BundleStatus, SwapRequest, SwapResult};
use crate::validation::MAX_SLIPPAGE_BPS;
use crate::wallet::WalletManager;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use std::time::Duration;

/// Slippage tolerance for zero-based attempt `attempt`
///
/// `ceil(base × (1 + 0.5 × attempt))`, computed exactly as
/// `ceil(base × (2 + attempt) / 2)`. Not clamped; callers clamp to the
/// router's maximum before sending.
pub fn escalated_slippage_bps(base_bps: u16, attempt: u32) -> u64 {
    (base_bps as u64 * (2 + attempt as u64)).div_ceil(2)
}

/// Drives swaps through the full quote-to-landing pipeline
pub struct SwapEngine {
    ledger: Arc<dyn LedgerClient>,
    router: Arc<dyn RouteProvider>,
    wallet: WalletManager,
    simulator: SimulationEngine,
    submitter: BundleSubmitter,
    tip: TipPolicy,
    retry: RetryConfig,
    fees: FeeConfig,
}

impl SwapEngine {
    /// Assemble an engine from explicit collaborators
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        router: Arc<dyn RouteProvider>,
        relay: Arc<dyn BundleRelay>,
        wallet: WalletManager,
        config: &Config,
    ) -> Result<Self, SwapError> {
        config
            .validate()
            .map_err(|e| SwapError::Configuration(e.to_string()))?;

        let tip = TipPolicy::from_config(&config.relay)?;
        let simulator =
            SimulationEngine::new(Arc::clone(&ledger), config.retry.simulation_retry_delay());
        let submitter = BundleSubmitter::new(
            relay,
            config.retry.bundle_status_polls,
            config.retry.bundle_poll_interval(),
        );

        Ok(Self {
            ledger,
            router,
            wallet,
            simulator,
            submitter,
            tip,
            retry: config.retry.clone(),
            fees: config.fees.clone(),
        })
    }

    /// Engine talking to a Solana RPC node, the Jupiter API and the Jito relay
    pub fn from_config(config: &Config, wallet: WalletManager) -> Result<Self, SwapError> {
        let ledger = Arc::new(SolanaLedger::new(
            &config.rpc.url,
            Duration::from_secs(config.rpc.timeout_secs),
        ));
        let router = Arc::new(JupiterClient::new(&config.routing)?);
        let relay = Arc::new(JitoRelay::new(&config.relay)?);
        Self::new(ledger, router, relay, wallet, config)
    }

    pub fn payer(&self) -> solana_sdk::pubkey::Pubkey {
        self.wallet.pubkey()
    }

    /// Execute a swap with bounded retries
    ///
    /// Returns `Ok(None)` when the payer cannot cover rent for the swap's
    /// accounts: nothing was submitted and retrying cannot help.
    pub async fn execute_swap(&self, request: &SwapRequest) -> Result<Option<SwapResult>, SwapError> {
        metrics().swaps_started.inc();
        let root = TraceContext::new("execute_swap");
        let max_attempts = request.max_retries();
        let mut last_error = None;

        for attempt in 0..max_attempts {
            let ctx = root.child_span(&format!("attempt_{}", attempt + 1));
            let logger = SwapLogger::new(&ctx);
            let slippage_bps = escalated_slippage_bps(request.slippage_bps(), attempt)
                .min(MAX_SLIPPAGE_BPS as u64) as u16;

            logger.log_attempt_start(attempt, max_attempts, slippage_bps);
            metrics().attempts_total.inc();
            let timer = Timer::new();

            let outcome = self.run_attempt(request, slippage_bps, &logger).await;
            timer.observe_duration(&metrics().attempt_latency);

            match outcome {
                Ok(result) => {
                    metrics().swaps_landed.inc();
                    if let BundleStatus::Landed { slot } = result.bundle_status.status {
                        logger.log_swap_landed(&result.transaction_signature, slot, timer.elapsed_ms());
                    }
                    return Ok(Some(result));
                }
                Err(SwapError::InsufficientFundsForRent) => {
                    metrics().swaps_skipped.inc();
                    logger.warn("Insufficient funds for rent, skipping this swap");
                    return Ok(None);
                }
                Err(err) => {
                    metrics().record_attempt_failure(err.category());
                    logger.log_attempt_failure(attempt, max_attempts, &err);

                    if !err.is_retryable() {
                        metrics().swaps_failed.inc();
                        return Err(err);
                    }
                    last_error = Some(err);

                    if attempt + 1 < max_attempts {
                        tokio::time::sleep(self.retry.outer_retry_delay()).await;
                    }
                }
            }
        }

        metrics().swaps_failed.inc();
        Err(SwapError::RetriesExhausted {
            attempts: max_attempts,
            last_error: Box::new(last_error.unwrap_or_else(|| {
                SwapError::Configuration("no attempts were made".to_string())
            })),
        })
    }

    async fn run_attempt(
        &self,
        request: &SwapRequest,
        slippage_bps: u16,
        logger: &SwapLogger,
    ) -> Result<SwapResult, SwapError> {
        let payer = self.wallet.pubkey();

        let asset = fetch_asset_info(self.ledger.as_ref(), request.input_mint()).await?;
        let base_units = asset.to_base_units(request.amount())?;

        let quote = self
            .router
            .quote(request.input_mint(), request.output_mint(), base_units, slippage_bps)
            .await?;
        logger.log_quote(base_units, quote.route_count());

        let payload = self.router.swap_instructions(&quote, &payer).await?;
        let instructions = assemble_instructions(&payload, &payer)?;
        let tables =
            resolve_lookup_tables(self.ledger.as_ref(), &payload.address_lookup_table_addresses)
                .await;
        let table_count = tables.len();

        let compute_units = {
            let (ixs, payer, simulator) = (&instructions, &payer, &self.simulator);
            let primary = self.retry.simulation_max_attempts;
            let secondary = self.retry.fallback_simulation_max_attempts;
            with_lookup_table_fallback(fallback::STAGE_SIMULATION, tables.clone(), move |tables, pass| {
                let attempts = match pass {
                    TablePass::Primary => primary,
                    TablePass::Fallback => secondary,
                };
                async move {
                    simulator
                        .simulate(ixs, payer, &tables, attempts)
                        .await?
                        .into_compute_units()
                }
            })
            .await?
        };
        logger.log_simulation(compute_units, table_count);

        let fee = estimate_priority_fee(self.ledger.as_ref(), &self.fees).await?;
        logger.log_priority_fee(&fee);

        let blockhash = self
            .ledger
            .get_latest_blockhash(CommitmentConfig::finalized())
            .await?;

        let (message, tables_used) = {
            let (ixs, payer, fee) = (&instructions, &payer, &fee);
            with_lookup_table_fallback(fallback::STAGE_BUILD, tables, move |tables, _| {
                let built = build_swap_message(ixs, payer, &tables, blockhash, compute_units, fee)
                    .map(|message| (message, tables.len()));
                async move { built }
            })
            .await?
        };

        let swap_tx = sign_message(message, &self.wallet, tables_used)?;
        let tip_tx = self.tip.build_tip(&self.wallet, swap_tx.recent_blockhash())?;
        let bundle = Bundle::new(swap_tx, tip_tx);
        let transaction_signature = bundle.swap_signature();

        let report = self.submitter.submit_and_confirm(&bundle, logger).await?;

        Ok(SwapResult {
            bundle_status: report,
            transaction_signature,
        })
    }
}
