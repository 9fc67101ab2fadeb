//! Bundle submission and status polling

use crate::bundle::{Bundle, BundleSubmitter, TipPolicy};
use crate::errors::SwapError;
use crate::observability::TraceContext;
use crate::structured_logging::SwapLogger;
use crate::test_utils::MockRelay;
use crate::tx_builder::{build_swap_message, sign_message};
use crate::types::{BundleStatus, PriorityFee};
use crate::wallet::WalletManager;
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Keypair,
};
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(15);

fn signed_bundle(tip: &TipPolicy) -> Bundle {
    let wallet = WalletManager::from_keypair(Keypair::new());
    let payer = wallet.pubkey();
    let ix = Instruction::new_with_bytes(
        Pubkey::new_unique(),
        &[1, 2, 3],
        vec![AccountMeta::new(payer, true)],
    );
    let fee = PriorityFee {
        micro_lamports_per_unit: 10_000,
        estimated_cost_sol: 0.002,
    };
    let blockhash = Hash::new_unique();
    let message = build_swap_message(&[ix], &payer, &[], blockhash, 200_000, &fee).unwrap();
    let swap = sign_message(message, &wallet, 0).unwrap();
    let tip_tx = tip.build_tip(&wallet, blockhash).unwrap();
    Bundle::new(swap, tip_tx)
}

fn logger() -> SwapLogger {
    SwapLogger::new(&TraceContext::new("bundle_test"))
}

fn submitter(relay: &Arc<MockRelay>) -> BundleSubmitter {
    BundleSubmitter::new(relay.clone(), 3, POLL_INTERVAL)
}

#[tokio::test(start_paused = true)]
async fn test_lands_on_third_poll() {
    let relay = Arc::new(MockRelay::with_statuses(vec![
        BundleStatus::Pending,
        BundleStatus::Pending,
        BundleStatus::Landed { slot: 123 },
    ]));
    let bundle = signed_bundle(&TipPolicy::disabled());

    let started = tokio::time::Instant::now();
    let report = submitter(&relay)
        .submit_and_confirm(&bundle, &logger())
        .await
        .unwrap();

    assert_eq!(report.bundle_id, "bundle-1");
    assert_eq!(report.status, BundleStatus::Landed { slot: 123 });
    assert_eq!(report.resubmissions, 0);
    assert_eq!(started.elapsed(), POLL_INTERVAL * 3);
    assert_eq!(relay.submission_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_status_resubmits_under_new_id() {
    let relay = Arc::new(MockRelay::with_statuses(vec![
        BundleStatus::Failed,
        BundleStatus::Pending,
        BundleStatus::Landed { slot: 9 },
    ]));
    let bundle = signed_bundle(&TipPolicy::disabled());

    let report = submitter(&relay)
        .submit_and_confirm(&bundle, &logger())
        .await
        .unwrap();

    assert_eq!(report.bundle_id, "bundle-2");
    assert_eq!(report.resubmissions, 1);
    assert_eq!(
        *relay.polled_ids.lock(),
        vec!["bundle-1", "bundle-2", "bundle-2"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_poll_error_counts_as_pending() {
    let relay = Arc::new(MockRelay::new());
    relay.push_status(Err(SwapError::transport("relay", "timed out")));
    relay.push_status(Ok(BundleStatus::Landed { slot: 44 }));
    let bundle = signed_bundle(&TipPolicy::disabled());

    let report = submitter(&relay)
        .submit_and_confirm(&bundle, &logger())
        .await
        .unwrap();

    assert_eq!(report.status, BundleStatus::Landed { slot: 44 });
    assert_eq!(relay.submission_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poll_bound_exhaustion_times_out() {
    let relay = Arc::new(MockRelay::with_statuses(vec![
        BundleStatus::Pending,
        BundleStatus::Failed,
        BundleStatus::Pending,
    ]));
    let bundle = signed_bundle(&TipPolicy::disabled());

    let started = tokio::time::Instant::now();
    let err = submitter(&relay)
        .submit_and_confirm(&bundle, &logger())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SwapError::BundleLandingTimeout { ref bundle_id, polls: 3 } if bundle_id == "bundle-2"
    ));
    assert_eq!(started.elapsed(), POLL_INTERVAL * 3);
    assert_eq!(relay.polled_ids.lock().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_submission_error_propagates() {
    let relay = Arc::new(MockRelay::new());
    relay.fail_submissions(SwapError::relay("bundle rejected: tip too low"));
    let bundle = signed_bundle(&TipPolicy::disabled());

    let err = submitter(&relay)
        .submit_and_confirm(&bundle, &logger())
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::Relay(ref reason) if reason.contains("tip too low")));
    assert!(relay.polled_ids.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tip_transaction_rides_after_swap() {
    let relay = Arc::new(MockRelay::with_statuses(vec![BundleStatus::Landed { slot: 1 }]));
    let tip = TipPolicy {
        lamports: 5_000,
        accounts: vec![Pubkey::new_unique()],
    };
    let bundle = signed_bundle(&tip);
    assert!(bundle.has_tip());

    submitter(&relay)
        .submit_and_confirm(&bundle, &logger())
        .await
        .unwrap();

    let submitted = relay.submitted.lock().clone();
    assert_eq!(submitted[0].len(), 2);
    assert_eq!(submitted[0][0].signatures[0], bundle.swap_signature());
    assert!(submitted[0][1]
        .message
        .static_account_keys()
        .contains(&tip.accounts[0]));
}
