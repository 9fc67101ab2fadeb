//! Bundle submission and confirmation
//!
//! A [`Bundle`] is the swap transaction plus an optional relay tip. The
//! [`BundleSubmitter`] drives it through the relay:
//!
//! ```text
//! Built ──submit──> Submitted ──poll──> Landed   (terminal)
//!                       ^                Pending  (keep waiting)
//!                       └──resubmit───── Failed
//! ```
//!
//! A resubmission sends the same signed transactions again. Their blockhash
//! keeps aging across polls, so a late resubmission can be rejected as
//! expired; the outer retry loop then rebuilds from a fresh quote.

pub mod relay;
pub mod tip;

pub use relay::{BundleRelay, JitoRelay};
pub use tip::TipPolicy;

use crate::errors::SwapError;
use crate::metrics::{metrics, Timer};
use crate::structured_logging::SwapLogger;
use crate::tx_builder::TxBuildOutput;
use crate::types::{BundleReport, BundleStatus};
use solana_sdk::{signature::Signature, transaction::VersionedTransaction};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Ordered group of signed transactions landed atomically
///
/// The swap transaction is always first.
#[derive(Debug, Clone)]
pub struct Bundle {
    swap: TxBuildOutput,
    tip: Option<TxBuildOutput>,
}

impl Bundle {
    pub fn new(swap: TxBuildOutput, tip: Option<TxBuildOutput>) -> Self {
        Self { swap, tip }
    }

    /// Transactions in submission order
    pub fn transactions(&self) -> impl Iterator<Item = &VersionedTransaction> {
        std::iter::once(&self.swap.tx).chain(self.tip.iter().map(|t| &t.tx))
    }

    pub fn transaction_count(&self) -> usize {
        1 + usize::from(self.tip.is_some())
    }

    /// Signature identifying the swap on-chain
    pub fn swap_signature(&self) -> Signature {
        self.swap.signature()
    }

    pub fn has_tip(&self) -> bool {
        self.tip.is_some()
    }
}

/// Lifecycle of a bundle inside one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleState {
    Built,
    Submitted { bundle_id: String },
    Pending { bundle_id: String },
    Failed { bundle_id: String },
    Landed { bundle_id: String, slot: u64 },
}

impl BundleState {
    /// State after the relay reported `status` for `bundle_id`
    pub fn after_poll(bundle_id: &str, status: BundleStatus) -> Self {
        let bundle_id = bundle_id.to_string();
        match status {
            BundleStatus::Landed { slot } => Self::Landed { bundle_id, slot },
            BundleStatus::Failed => Self::Failed { bundle_id },
            BundleStatus::Pending => Self::Pending { bundle_id },
        }
    }

    pub fn bundle_id(&self) -> Option<&str> {
        match self {
            Self::Built => None,
            Self::Submitted { bundle_id }
            | Self::Pending { bundle_id }
            | Self::Failed { bundle_id }
            | Self::Landed { bundle_id, .. } => Some(bundle_id),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Landed { .. })
    }
}

/// Submits a bundle and polls until it lands or the poll bound runs out
pub struct BundleSubmitter {
    relay: Arc<dyn BundleRelay>,
    max_status_polls: u32,
    poll_interval: Duration,
}

impl BundleSubmitter {
    pub fn new(relay: Arc<dyn BundleRelay>, max_status_polls: u32, poll_interval: Duration) -> Self {
        Self {
            relay,
            max_status_polls,
            poll_interval,
        }
    }

    async fn submit(&self, bundle: &Bundle) -> Result<BundleState, SwapError> {
        let bundle_id = self.relay.submit_bundle(bundle).await?;
        metrics().bundle_submissions.inc();
        debug!(bundle_id = %bundle_id, transactions = bundle.transaction_count(), "Bundle submitted");
        Ok(BundleState::Submitted { bundle_id })
    }

    /// Submit `bundle` and wait for it to land
    ///
    /// Each cycle waits `poll_interval` before polling. `Failed` triggers a
    /// resubmission of the same bundle under a new id; a poll that errors is
    /// treated as `Pending` for that cycle.
    pub async fn submit_and_confirm(
        &self,
        bundle: &Bundle,
        logger: &SwapLogger,
    ) -> Result<BundleReport, SwapError> {
        let timer = Timer::new();
        let mut state = self.submit(bundle).await?;
        let mut resubmissions = 0u32;

        for poll in 1..=self.max_status_polls {
            tokio::time::sleep(self.poll_interval).await;

            let bundle_id = state.bundle_id().unwrap_or_default().to_string();
            let status = match self.relay.get_bundle_status(&bundle_id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(bundle_id = %bundle_id, poll, error = %e, "Bundle status poll failed");
                    BundleStatus::Pending
                }
            };
            logger.log_bundle_status(&bundle_id, poll, &status);

            state = BundleState::after_poll(&bundle_id, status);
            if state.is_terminal() {
                timer.observe_duration(&metrics().bundle_landing_latency);
                return Ok(BundleReport {
                    bundle_id,
                    status,
                    resubmissions,
                });
            }
            if matches!(state, BundleState::Failed { .. }) {
                logger.warn("Bundle failed, resubmitting");
                state = self.submit(bundle).await?;
                resubmissions += 1;
                metrics().bundle_resubmissions.inc();
            }
        }

        Err(SwapError::BundleLandingTimeout {
            bundle_id: state.bundle_id().unwrap_or_default().to_string(),
            polls: self.max_status_polls,
        })
    }
}
