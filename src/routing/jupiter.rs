//! Jupiter v6 HTTP client

use super::{InstructionPayload, Quote, RouteProvider};
use crate::config::RoutingConfig;
use crate::errors::SwapError;
use async_trait::async_trait;
use reqwest::Client;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tracing::{debug, warn};

const ENDPOINT: &str = "router";

/// Error code the router uses when no market connects the two assets
const NO_ROUTE_CODE: &str = "COULD_NOT_FIND_ANY_ROUTE";

/// [`RouteProvider`] talking to the Jupiter v6 quote API
#[derive(Debug, Clone)]
pub struct JupiterClient {
    http: Client,
    base_url: String,
    wrap_and_unwrap_sol: bool,
}

impl JupiterClient {
    pub fn new(config: &RoutingConfig) -> Result<Self, SwapError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SwapError::Configuration(format!("router HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            wrap_and_unwrap_sol: config.wrap_and_unwrap_sol,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RouteProvider for JupiterClient {
    async fn quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<Quote, SwapError> {
        let url = format!("{}/quote", self.base_url);
        debug!(%input_mint, %output_mint, amount, slippage_bps, "Requesting quote");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", input_mint.to_string()),
                ("outputMint", output_mint.to_string()),
                ("amount", amount.to_string()),
                ("slippageBps", slippage_bps.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if body.contains(NO_ROUTE_CODE) {
                return Err(SwapError::NoRoute(body));
            }
            warn!(%status, "Quote request rejected");
            return Err(SwapError::transport(
                ENDPOINT,
                format!("quote returned {}: {}", status, body),
            ));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, format!("JSON parse error: {}", e)))?;

        Quote::from_value(body)
    }

    async fn swap_instructions(
        &self,
        quote: &Quote,
        payer: &Pubkey,
    ) -> Result<InstructionPayload, SwapError> {
        let url = format!("{}/swap-instructions", self.base_url);
        let payload = serde_json::json!({
            "quoteResponse": quote.raw(),
            "userPublicKey": payer.to_string(),
            "wrapAndUnwrapSol": self.wrap_and_unwrap_sol,
        });

        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "Swap instruction request rejected");
            return Err(SwapError::transport(
                ENDPOINT,
                format!("swap-instructions returned {}: {}", status, body),
            ));
        }

        let instructions: InstructionPayload = resp
            .json()
            .await
            .map_err(|e| SwapError::transport(ENDPOINT, format!("JSON parse error: {}", e)))?;

        if let Some(error) = &instructions.error {
            return Err(SwapError::InstructionFetch(error.clone()));
        }

        Ok(instructions)
    }
}
