//! Error taxonomy for the swap executor
//!
//! Every stage of an attempt reports failures through [`SwapError`]. The
//! orchestrator decides what to do with an error purely from its variant:
//! - `Validation` is never retried
//! - `InsufficientFundsForRent` ends the swap as a clean no-op
//! - everything else abandons the current attempt and starts the next one
//!
//! Stage-local retries (simulation attempts, bundle polls) happen before an
//! error ever reaches this level.

use thiserror::Error;

/// Input validation failures, one variant per request field
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Asset address is not a 32-44 character base-58 string
    #[error("Invalid mint address: {0}")]
    InvalidMint(String),

    /// Amount is zero, negative, NaN or infinite
    #[error("Invalid amount: {0}. Amount must be a positive number.")]
    InvalidAmount(f64),

    /// Amount is positive but rounds to zero base units
    #[error("Amount {amount} is below the precision of a {decimals}-decimal asset")]
    AmountBelowPrecision { amount: f64, decimals: u8 },

    /// Slippage outside `[0, 10000]` basis points
    #[error("Invalid slippage: {0}. Slippage must be a number between 0 and 10000.")]
    InvalidSlippage(i64),

    /// Retry bound is not a positive integer
    #[error("Invalid max retries: {0}. Max retries must be a positive integer.")]
    InvalidRetries(i64),
}

/// Error type for every swap operation
#[derive(Error, Debug, Clone)]
pub enum SwapError {
    /// Malformed request parameters
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The routing service returned a quote without any route
    #[error("No trading routes found: {0}")]
    NoRoute(String),

    /// The routing service answered the instruction request with an error body
    ///
    /// The transport call itself succeeded; this usually means the quote
    /// went stale between the two requests.
    #[error("Failed to get swap instructions: {0}")]
    InstructionFetch(String),

    /// A wire instruction could not be decoded
    #[error("Instruction decode error (field={field}): {reason}")]
    InstructionDecode {
        /// Which part of the wire instruction was malformed
        field: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// Simulation did not produce a compute estimate
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// The payer cannot cover rent for an account the swap creates
    #[error("Insufficient funds for rent")]
    InsufficientFundsForRent,

    /// The swap message could not be compiled
    #[error("Transaction build error: {0}")]
    TransactionBuild(String),

    /// Failed to sign the transaction
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The bundle relay rejected a request
    #[error("Relay error: {0}")]
    Relay(String),

    /// Poll/resubmit cycles ran out before the bundle landed
    #[error("Bundle {bundle_id} did not land after {polls} status polls")]
    BundleLandingTimeout {
        /// Last bundle id that was being tracked
        bundle_id: String,
        /// Number of status polls performed
        polls: u32,
    },

    /// Network-level failure talking to a collaborator
    #[error("Transport error ({endpoint}): {message}")]
    Transport {
        /// Which collaborator was being called
        endpoint: String,
        /// Underlying error text
        message: String,
    },

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The outer attempt bound was exhausted
    #[error("Failed to execute swap after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of outer attempts made
        attempts: u32,
        /// Failure observed on the final attempt
        last_error: Box<SwapError>,
    },
}

impl SwapError {
    /// Whether the orchestrator may start another outer attempt after this error
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::InsufficientFundsForRent => false,
            Self::Configuration(_) => false,
            Self::RetriesExhausted { .. } => false,

            Self::NoRoute(_) => true,
            Self::InstructionFetch(_) => true,
            Self::InstructionDecode { .. } => true,
            Self::Simulation(_) => true,
            Self::TransactionBuild(_) => true,
            Self::Signing(_) => true,
            Self::Relay(_) => true,
            Self::BundleLandingTimeout { .. } => true,
            Self::Transport { .. } => true,
        }
    }

    /// Whether repeating the failed stage without lookup tables could help
    ///
    /// A rent shortfall or bad input does not depend on which tables were
    /// attached, so those errors are conclusive.
    pub fn allows_lookup_table_fallback(&self) -> bool {
        !matches!(
            self,
            Self::Validation(_) | Self::InsufficientFundsForRent | Self::Configuration(_)
        )
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NoRoute(_) => "no_route",
            Self::InstructionFetch(_) => "instruction_fetch",
            Self::InstructionDecode { .. } => "instruction_decode",
            Self::Simulation(_) => "simulation",
            Self::InsufficientFundsForRent => "insufficient_funds_for_rent",
            Self::TransactionBuild(_) => "build",
            Self::Signing(_) => "signing",
            Self::Relay(_) => "relay",
            Self::BundleLandingTimeout { .. } => "bundle_timeout",
            Self::Transport { .. } => "transport",
            Self::Configuration(_) => "config",
            Self::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}

// Convenience constructors for common error scenarios
impl SwapError {
    /// Create a transport error for a named collaborator endpoint
    pub fn transport(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Create an instruction decode error
    pub fn decode_failed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionDecode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a simulation failure error
    pub fn simulation_failed(reason: impl Into<String>) -> Self {
        Self::Simulation(reason.into())
    }

    /// Create a relay error
    pub fn relay(reason: impl Into<String>) -> Self {
        Self::Relay(reason.into())
    }
}
