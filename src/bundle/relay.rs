//! Bundle relay transport
//!
//! [`JitoRelay`] speaks the block-engine JSON-RPC dialect:
//! - `sendBundle` with `[[base64 txs], {"encoding": "base64"}]` returns a bundle id
//! - `getInflightBundleStatuses` with `[[bundle_id]]` reports the bundle state

use super::Bundle;
use crate::config::RelayConfig;
use crate::errors::SwapError;
use crate::types::BundleStatus;
use async_trait::async_trait;
use base64::prelude::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

const ENDPOINT: &str = "relay";

/// Private submission channel that lands bundles atomically
#[async_trait]
pub trait BundleRelay: Send + Sync {
    /// Submit a bundle, returning the relay-assigned id
    async fn submit_bundle(&self, bundle: &Bundle) -> Result<String, SwapError>;

    /// Current status of a previously submitted bundle
    async fn get_bundle_status(&self, bundle_id: &str) -> Result<BundleStatus, SwapError>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a, T> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: T,
}

#[derive(Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct InflightStatuses {
    #[serde(default)]
    value: Vec<InflightStatus>,
}

#[derive(Deserialize)]
struct InflightStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    landed_slot: Option<u64>,
}

impl InflightStatus {
    fn to_bundle_status(&self) -> BundleStatus {
        match (self.status.as_str(), self.landed_slot) {
            ("Landed", Some(slot)) => BundleStatus::Landed { slot },
            ("Landed", None) => BundleStatus::Landed { slot: 0 },
            ("Failed", _) => BundleStatus::Failed,
            // "Pending", "Invalid" (not yet seen by the engine) and anything new
            _ => BundleStatus::Pending,
        }
    }
}

/// [`BundleRelay`] backed by the Jito block engine
#[derive(Debug)]
pub struct JitoRelay {
    http: Client,
    url: String,
    next_id: AtomicU64,
}

impl JitoRelay {
    pub fn new(config: &RelayConfig) -> Result<Self, SwapError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SwapError::Configuration(format!("relay HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn rpc_call<P, R>(&self, method: &str, params: P) -> Result<R, SwapError>
    where
        P: Serialize + Send,
        R: serde::de::DeserializeOwned,
    {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let res = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, e))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(SwapError::transport(
                ENDPOINT,
                format!("{} returned {}: {}", method, status, text),
            ));
        }

        let out: JsonRpcResponse<R> = res
            .json()
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, format!("JSON parse error: {}", e)))?;

        if let Some(err) = out.error {
            return Err(SwapError::relay(format!(
                "{} rpc error {}: {}",
                method, err.code, err.message
            )));
        }
        out.result
            .ok_or_else(|| SwapError::relay(format!("{} returned an empty result", method)))
    }
}

/// Serialize a bundle's transactions into base64 wire strings
pub fn encode_bundle(bundle: &Bundle) -> Result<Vec<String>, SwapError> {
    bundle
        .transactions()
        .map(|tx| {
            bincode::serialize(tx)
                .map(|bytes| BASE64_STANDARD.encode(bytes))
                .map_err(|e| SwapError::relay(format!("encode transaction: {}", e)))
        })
        .collect()
}

#[async_trait]
impl BundleRelay for JitoRelay {
    async fn submit_bundle(&self, bundle: &Bundle) -> Result<String, SwapError> {
        let encoded = encode_bundle(bundle)?;
        debug!(transactions = encoded.len(), "Sending bundle");

        let params = (encoded, serde_json::json!({ "encoding": "base64" }));
        self.rpc_call::<_, String>("sendBundle", params).await
    }

    async fn get_bundle_status(&self, bundle_id: &str) -> Result<BundleStatus, SwapError> {
        let params = (vec![bundle_id.to_string()],);
        let statuses: InflightStatuses = self
            .rpc_call("getInflightBundleStatuses", params)
            .await?;

        Ok(statuses
            .value
            .first()
            .map(InflightStatus::to_bundle_status)
            .unwrap_or(BundleStatus::Pending))
    }
}
