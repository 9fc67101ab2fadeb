//! Jupiter v6 wire structures

use crate::errors::SwapError;
use serde::{Deserialize, Serialize};

/// An opaque route quote
///
/// The router expects its own quote body back verbatim on the
/// `/swap-instructions` request, so the raw JSON is kept untouched and only
/// the fields the pipeline reads are extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    raw: serde_json::Value,
    route_count: usize,
}

impl Quote {
    /// Wrap a quote body, rejecting quotes without a route plan
    pub fn from_value(raw: serde_json::Value) -> Result<Self, SwapError> {
        let route_count = raw
            .get("routePlan")
            .and_then(|plan| plan.as_array())
            .map(|plan| plan.len())
            .ok_or_else(|| SwapError::NoRoute("quote has no routePlan".to_string()))?;

        if route_count == 0 {
            return Err(SwapError::NoRoute("routePlan is empty".to_string()));
        }

        Ok(Self { raw, route_count })
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Number of hops in the route plan
    pub fn route_count(&self) -> usize {
        self.route_count
    }

    /// Quoted output amount in base units of the output asset
    pub fn out_amount(&self) -> Option<u64> {
        self.raw
            .get("outAmount")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }
}

/// Account reference inside a wire instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// Instruction as returned by the router: base-58 addresses, base64 data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInstruction {
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<WireAccountMeta>,
    pub data: String,
}

/// Response of `POST /swap-instructions`
///
/// The router's own compute-budget instructions are not captured; the
/// builder sets its own limit and price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionPayload {
    #[serde(default)]
    pub setup_instructions: Vec<WireInstruction>,

    #[serde(default)]
    pub swap_instruction: Option<WireInstruction>,

    #[serde(default)]
    pub cleanup_instruction: Option<WireInstruction>,

    #[serde(default)]
    pub address_lookup_table_addresses: Vec<String>,

    /// Present when the router could not produce instructions for the quote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
