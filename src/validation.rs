//! Request validation
//!
//! Pure checks that run before any network call. Each check fails with its
//! own [`ValidationError`] variant so callers can tell which field was bad.

use crate::errors::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Upper bound for slippage tolerance (100%)
pub const MAX_SLIPPAGE_BPS: i64 = 10_000;

static MINT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("mint address pattern is valid")
});

/// Validate an asset address and parse it into a [`Pubkey`]
pub fn validate_mint(mint: &str) -> Result<Pubkey, ValidationError> {
    if !MINT_PATTERN.is_match(mint) {
        return Err(ValidationError::InvalidMint(mint.to_string()));
    }
    // The alphabet check admits strings that decode to the wrong byte length
    Pubkey::from_str(mint).map_err(|_| ValidationError::InvalidMint(mint.to_string()))
}

/// Amount must be finite and strictly positive
pub fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Slippage must lie in `[0, 10000]` basis points
pub fn validate_slippage(slippage_bps: i64) -> Result<u16, ValidationError> {
    if !(0..=MAX_SLIPPAGE_BPS).contains(&slippage_bps) {
        return Err(ValidationError::InvalidSlippage(slippage_bps));
    }
    Ok(slippage_bps as u16)
}

/// Retry count must be a positive integer
pub fn validate_retries(max_retries: i64) -> Result<u32, ValidationError> {
    if max_retries < 1 || max_retries > u32::MAX as i64 {
        return Err(ValidationError::InvalidRetries(max_retries));
    }
    Ok(max_retries as u32)
}
