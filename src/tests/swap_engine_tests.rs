//! End-to-end orchestrator scenarios

use crate::config::Config;
use crate::errors::{SwapError, ValidationError};
use crate::routing::InstructionPayload;
use crate::swap_engine::SwapEngine;
use crate::test_utils::{
    fast_config, lookup_table_data, simulation_err, swap_payload, MockLedger, MockRelay,
    MockRouter, USDC_MINT, WSOL_MINT,
};
use crate::types::{BundleStatus, SwapRequest};
use crate::wallet::WalletManager;
use solana_sdk::{
    commitment_config::CommitmentConfig, compute_budget::ComputeBudgetInstruction, pubkey::Pubkey,
    signature::Keypair, system_program,
};
use std::str::FromStr;
use std::sync::Arc;

struct Harness {
    ledger: Arc<MockLedger>,
    router: Arc<MockRouter>,
    relay: Arc<MockRelay>,
    engine: SwapEngine,
}

/// Payer plus a router payload whose swap touches `extra` accounts
struct Fixture {
    wallet: WalletManager,
    extra: Vec<Pubkey>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            wallet: WalletManager::from_keypair(Keypair::new()),
            extra: (0..6).map(|_| Pubkey::new_unique()).collect(),
        }
    }

    fn payload(&self, tables: &[Pubkey]) -> InstructionPayload {
        swap_payload(&self.wallet.pubkey(), &self.extra, tables)
    }

    fn harness(self, config: &Config, payload: InstructionPayload, relay: MockRelay) -> Harness {
        let ledger = Arc::new(MockLedger::with_default_mints());
        let router = Arc::new(MockRouter::new(payload));
        let relay = Arc::new(relay);
        let engine = SwapEngine::new(
            ledger.clone(),
            router.clone(),
            relay.clone(),
            self.wallet,
            config,
        )
        .expect("engine builds");

        Harness {
            ledger,
            router,
            relay,
            engine,
        }
    }
}

fn request(slippage_bps: i64, max_retries: i64) -> SwapRequest {
    SwapRequest::new(WSOL_MINT, USDC_MINT, 0.01, slippage_bps, max_retries).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_swap_lands_with_partial_lookup_tables() {
    let fixture = Fixture::new();
    let payer = fixture.wallet.pubkey();
    let resolvable = Pubkey::new_unique();
    let missing = Pubkey::new_unique();
    let payload = fixture.payload(&[resolvable, missing]);
    let extra = fixture.extra.clone();

    let relay = MockRelay::with_statuses(vec![
        BundleStatus::Pending,
        BundleStatus::Pending,
        BundleStatus::Landed { slot: 123 },
    ]);
    let h = fixture.harness(&Config::default(), payload, relay);
    h.ledger.set_account(resolvable, lookup_table_data(&extra));

    let result = h
        .engine
        .execute_swap(&request(100, 5))
        .await
        .unwrap()
        .expect("swap lands");

    assert_eq!(result.bundle_status.status, BundleStatus::Landed { slot: 123 });
    assert_eq!(result.bundle_status.bundle_id, "bundle-1");
    assert_eq!(result.bundle_status.resubmissions, 0);

    // 0.01 SOL at 9 decimals, first attempt uses the base slippage
    assert_eq!(*h.router.quoted_amounts.lock(), vec![10_000_000]);
    assert_eq!(h.router.slippage_history(), vec![100]);

    // Simulated once, with the single resolvable table attached
    let simulated = h.ledger.simulated.lock().clone();
    assert_eq!(simulated.len(), 1);
    assert_eq!(simulated[0].lookup_tables, 1);

    assert_eq!(
        *h.ledger.blockhash_commitments.lock(),
        vec![CommitmentConfig::confirmed(), CommitmentConfig::finalized()]
    );

    let submitted = h.relay.submitted.lock().clone();
    assert_eq!(submitted.len(), 1);
    let bundle = &submitted[0];
    assert_eq!(bundle.len(), 2, "swap plus tip");

    let swap_tx = &bundle[0];
    assert_eq!(swap_tx.signatures[0], result.transaction_signature);
    assert_eq!(*swap_tx.message.recent_blockhash(), h.ledger.blockhash());
    assert_eq!(swap_tx.message.static_account_keys()[0], payer);

    let compiled = swap_tx.message.instructions();
    assert_eq!(compiled.len(), 5, "2 budget + setup + swap + cleanup");
    assert_eq!(
        compiled[0].data,
        ComputeBudgetInstruction::set_compute_unit_limit(120_000).data
    );
    assert_eq!(
        compiled[1].data,
        ComputeBudgetInstruction::set_compute_unit_price(10_000).data
    );

    // Tip goes to one of the configured tip accounts, same blockhash as the swap
    let tip_tx = &bundle[1];
    assert_eq!(*tip_tx.message.recent_blockhash(), h.ledger.blockhash());
    let tip_keys = tip_tx.message.static_account_keys();
    assert!(tip_keys.contains(&system_program::id()));
    let tip_accounts: Vec<Pubkey> = Config::default()
        .relay
        .tip_accounts
        .iter()
        .map(|s| Pubkey::from_str(s).unwrap())
        .collect();
    assert!(tip_keys.iter().any(|k| tip_accounts.contains(k)));
}

#[tokio::test]
async fn test_insufficient_rent_skips_without_submitting() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let h = fixture.harness(&fast_config(), payload, MockRelay::new());
    h.ledger.set_default_simulation(Ok(simulation_err(
        "InsufficientFundsForRent { account_index: 3 }",
    )));

    let outcome = h.engine.execute_swap(&request(100, 5)).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(h.relay.submission_count(), 0);
    assert_eq!(h.ledger.simulation_count(), 1);
    assert_eq!(h.router.slippage_history(), vec![100]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_bundle_is_resubmitted_then_lands() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let relay = MockRelay::with_statuses(vec![BundleStatus::Failed, BundleStatus::Landed { slot: 77 }]);
    let mut config = Config::default();
    config.relay.tip_lamports = 0;
    let h = fixture.harness(&config, payload, relay);

    let result = h
        .engine
        .execute_swap(&request(100, 5))
        .await
        .unwrap()
        .expect("swap lands");

    assert_eq!(result.bundle_status.bundle_id, "bundle-2");
    assert_eq!(result.bundle_status.resubmissions, 1);
    assert_eq!(result.bundle_status.status, BundleStatus::Landed { slot: 77 });

    let submitted = h.relay.submitted.lock().clone();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0], submitted[1], "resubmission reuses the signed bundle");
    assert_eq!(submitted[0].len(), 1, "tip disabled");
    assert_eq!(*h.relay.polled_ids.lock(), vec!["bundle-1", "bundle-2"]);
}

#[tokio::test(start_paused = true)]
async fn test_simulation_failures_exhaust_retries_with_escalating_slippage() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let h = fixture.harness(&Config::default(), payload, MockRelay::new());
    h.ledger
        .set_default_simulation(Ok(simulation_err("InstructionError(2, Custom(6001))")));

    let err = h.engine.execute_swap(&request(100, 2)).await.unwrap_err();

    match err {
        SwapError::RetriesExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 2);
            assert!(
                matches!(*last_error, SwapError::Simulation(ref reason) if reason.contains("Custom(6001)"))
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(h.router.slippage_history(), vec![100, 150]);
    // No tables attached: 5 simulation attempts per outer attempt, no fallback pass
    assert_eq!(h.ledger.simulation_count(), 10);
    assert_eq!(h.relay.submission_count(), 0);
}

#[tokio::test]
async fn test_simulation_falls_back_to_no_tables() {
    let fixture = Fixture::new();
    let table = Pubkey::new_unique();
    let payload = fixture.payload(&[table]);
    let extra = fixture.extra.clone();
    let relay = MockRelay::with_statuses(vec![BundleStatus::Landed { slot: 5 }]);
    let h = fixture.harness(&fast_config(), payload, relay);
    h.ledger.set_account(table, lookup_table_data(&extra));

    for _ in 0..5 {
        h.ledger
            .push_simulation(Ok(simulation_err("AccountNotFound")));
    }

    let result = h.engine.execute_swap(&request(100, 1)).await.unwrap();
    assert!(result.is_some());

    let tables_per_call: Vec<usize> = h
        .ledger
        .simulated
        .lock()
        .iter()
        .map(|call| call.lookup_tables)
        .collect();
    assert_eq!(tables_per_call, vec![1, 1, 1, 1, 1, 0]);
}

#[tokio::test]
async fn test_fallback_simulation_bound_applies() {
    let fixture = Fixture::new();
    let table = Pubkey::new_unique();
    let payload = fixture.payload(&[table]);
    let extra = fixture.extra.clone();
    let h = fixture.harness(&fast_config(), payload, MockRelay::new());
    h.ledger.set_account(table, lookup_table_data(&extra));
    h.ledger
        .set_default_simulation(Ok(simulation_err("ProgramFailedToComplete")));

    let err = h.engine.execute_swap(&request(100, 1)).await.unwrap_err();
    assert!(matches!(err, SwapError::RetriesExhausted { attempts: 1, .. }));

    let tables_per_call: Vec<usize> = h
        .ledger
        .simulated
        .lock()
        .iter()
        .map(|call| call.lookup_tables)
        .collect();
    assert_eq!(tables_per_call, vec![1, 1, 1, 1, 1, 0, 0, 0]);
}

#[tokio::test]
async fn test_amount_below_precision_is_not_retried() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let h = fixture.harness(&fast_config(), payload, MockRelay::new());

    let request = SwapRequest::new(WSOL_MINT, USDC_MINT, 1e-12, 100, 5).unwrap();
    let err = h.engine.execute_swap(&request).await.unwrap_err();

    assert!(matches!(
        err,
        SwapError::Validation(ValidationError::AmountBelowPrecision { decimals: 9, .. })
    ));
    assert!(h.router.slippage_history().is_empty());
}

#[tokio::test]
async fn test_no_route_is_retried_until_exhausted() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let h = fixture.harness(&fast_config(), payload, MockRelay::new());
    h.router
        .set_quote(Err(SwapError::NoRoute("routePlan is empty".into())));

    let err = h.engine.execute_swap(&request(100, 3)).await.unwrap_err();

    match err {
        SwapError::RetriesExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last_error, SwapError::NoRoute(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.router.slippage_history(), vec![100, 150, 200]);
}

#[tokio::test]
async fn test_escalated_slippage_is_clamped() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let h = fixture.harness(&fast_config(), payload, MockRelay::new());
    h.router
        .set_payload(Err(SwapError::InstructionFetch("quote expired".into())));

    let err = h.engine.execute_swap(&request(8_000, 3)).await.unwrap_err();

    assert!(matches!(err, SwapError::RetriesExhausted { attempts: 3, .. }));
    assert_eq!(h.router.slippage_history(), vec![8_000, 10_000, 10_000]);
}

#[tokio::test]
async fn test_bundle_that_never_lands_fails_the_attempt() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let h = fixture.harness(&fast_config(), payload, MockRelay::new());

    let err = h.engine.execute_swap(&request(100, 1)).await.unwrap_err();

    match err {
        SwapError::RetriesExhausted { last_error, .. } => {
            assert!(matches!(
                *last_error,
                SwapError::BundleLandingTimeout { ref bundle_id, polls: 3 } if bundle_id == "bundle-1"
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.relay.polled_ids.lock().len(), 3);
}

#[test]
fn test_engine_rejects_zero_poll_bound() {
    let mut config = fast_config();
    config.retry.bundle_status_polls = 0;
    let wallet = WalletManager::from_keypair(Keypair::new());
    let payload = swap_payload(&wallet.pubkey(), &[], &[]);

    let result = SwapEngine::new(
        Arc::new(MockLedger::new()),
        Arc::new(MockRouter::new(payload)),
        Arc::new(MockRelay::new()),
        wallet,
        &config,
    );
    assert!(matches!(result, Err(SwapError::Configuration(_))));
}
