//! Structured logging for swap lifecycle events

use crate::errors::SwapError;
use crate::observability::TraceContext;
use crate::types::{BundleStatus, PriorityFee};
use solana_sdk::signature::Signature;

/// Structured logger bound to one swap attempt's trace context
#[derive(Debug, Clone)]
pub struct SwapLogger {
    correlation_id: String,
    span_id: String,
}

impl SwapLogger {
    pub fn new(ctx: &TraceContext) -> Self {
        Self {
            correlation_id: ctx.correlation_id().to_string(),
            span_id: ctx.span_id().to_string(),
        }
    }

    pub fn log_attempt_start(&self, attempt: u32, max_attempts: u32, slippage_bps: u16) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            span_id = %self.span_id,
            attempt = attempt + 1,
            max_attempts = max_attempts,
            slippage_bps = slippage_bps,
            "Initiating swap attempt"
        );
    }

    pub fn log_quote(&self, base_units: u64, route_count: usize) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            base_units = base_units,
            route_count = route_count,
            "Quote received"
        );
    }

    pub fn log_simulation(&self, compute_units: u64, lookup_tables: usize) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            compute_units = compute_units,
            lookup_tables = lookup_tables,
            "Simulation produced compute estimate"
        );
    }

    pub fn log_priority_fee(&self, fee: &PriorityFee) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            micro_lamports = fee.micro_lamports_per_unit,
            estimated_cost_sol = fee.estimated_cost_sol,
            "Priority fee selected"
        );
    }

    pub fn log_bundle_status(&self, bundle_id: &str, poll: u32, status: &BundleStatus) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            bundle_id = %bundle_id,
            poll = poll,
            status = ?status,
            "Bundle status"
        );
    }

    pub fn log_swap_landed(&self, signature: &Signature, slot: u64, latency_ms: u64) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            signature = %signature,
            landed_slot = slot,
            latency_ms = latency_ms,
            "Swap executed successfully"
        );
    }

    pub fn log_attempt_failure(&self, attempt: u32, max_attempts: u32, error: &SwapError) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            span_id = %self.span_id,
            attempt = attempt + 1,
            max_attempts = max_attempts,
            category = error.category(),
            error = %error,
            "Swap attempt failed"
        );
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            message = %message,
            "Warning"
        );
    }
}
