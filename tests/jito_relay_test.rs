//! Integration tests for the Jito bundle relay client
//!
//! Covers the JSON-RPC envelope for `sendBundle` and
//! `getInflightBundleStatuses` and the mapping of relay responses.

use base64::prelude::*;
use bundle_swap::bundle::{Bundle, BundleRelay, JitoRelay, TipPolicy};
use bundle_swap::config::Config;
use bundle_swap::tx_builder::{build_swap_message, sign_message};
use bundle_swap::types::PriorityFee;
use bundle_swap::wallet::WalletManager;
use bundle_swap::{BundleStatus, Pubkey, SwapError};
use mockito::Matcher;
use serde_json::json;
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    signature::Keypair,
    transaction::VersionedTransaction,
};

fn relay(url: &str) -> JitoRelay {
    let mut config = Config::default().relay;
    config.url = url.to_string();
    JitoRelay::new(&config).unwrap()
}

fn bundle_with_tip() -> Bundle {
    let wallet = WalletManager::from_keypair(Keypair::new());
    let payer = wallet.pubkey();
    let ix = Instruction::new_with_bytes(
        Pubkey::new_unique(),
        &[4, 2],
        vec![AccountMeta::new(payer, true)],
    );
    let fee = PriorityFee {
        micro_lamports_per_unit: 10_000,
        estimated_cost_sol: 0.0012,
    };
    let blockhash = Hash::new_unique();
    let message = build_swap_message(&[ix], &payer, &[], blockhash, 120_000, &fee).unwrap();
    let swap = sign_message(message, &wallet, 0).unwrap();
    let tip = TipPolicy {
        lamports: 10_000,
        accounts: vec![Pubkey::new_unique()],
    }
    .build_tip(&wallet, blockhash)
    .unwrap();
    Bundle::new(swap, tip)
}

fn status_body(status: serde_json::Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {"context": {"slot": 280_000_100}, "value": [status]}
    })
    .to_string()
}

#[tokio::test]
async fn test_send_bundle_returns_id() {
    let mut server = mockito::Server::new_async().await;
    let bundle = bundle_with_tip();
    let encoded: Vec<String> = bundle
        .transactions()
        .map(|tx| BASE64_STANDARD.encode(bincode::serialize(tx).unwrap()))
        .collect();

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "sendBundle",
            "params": [encoded, {"encoding": "base64"}]
        })))
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": "b7c1e0"}).to_string())
        .create_async()
        .await;

    let bundle_id = relay(&server.url()).submit_bundle(&bundle).await.unwrap();

    mock.assert_async().await;
    assert_eq!(bundle_id, "b7c1e0");

    // Swap first, tip second, both decodable
    let swap: VersionedTransaction =
        bincode::deserialize(&BASE64_STANDARD.decode(&encoded[0]).unwrap()).unwrap();
    assert_eq!(swap.signatures[0], bundle.swap_signature());
}

#[tokio::test]
async fn test_send_bundle_rpc_error_is_relay_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32602, "message": "bundle must contain a tip"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = relay(&server.url())
        .submit_bundle(&bundle_with_tip())
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::Relay(ref reason) if reason.contains("bundle must contain a tip")));
}

#[tokio::test]
async fn test_rate_limited_submission_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let err = relay(&server.url())
        .submit_bundle(&bundle_with_tip())
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::Transport { ref endpoint, .. } if endpoint == "relay"));
}

#[tokio::test]
async fn test_inflight_status_mapping() {
    let cases = [
        (
            json!({"bundle_id": "b", "status": "Landed", "landed_slot": 280_000_042u64}),
            BundleStatus::Landed { slot: 280_000_042 },
        ),
        (
            json!({"bundle_id": "b", "status": "Failed", "landed_slot": null}),
            BundleStatus::Failed,
        ),
        (
            json!({"bundle_id": "b", "status": "Pending", "landed_slot": null}),
            BundleStatus::Pending,
        ),
        (
            json!({"bundle_id": "b", "status": "Invalid", "landed_slot": null}),
            BundleStatus::Pending,
        ),
    ];

    for (status, expected) in cases {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "getInflightBundleStatuses",
                "params": [["b"]]
            })))
            .with_status(200)
            .with_body(status_body(status))
            .create_async()
            .await;

        let actual = relay(&server.url()).get_bundle_status("b").await.unwrap();
        mock.assert_async().await;
        assert_eq!(actual, expected);
    }
}

#[tokio::test]
async fn test_unknown_bundle_is_pending() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": []}})
                .to_string(),
        )
        .create_async()
        .await;

    let status = relay(&server.url())
        .get_bundle_status("never-seen")
        .await
        .unwrap();
    assert_eq!(status, BundleStatus::Pending);
}
