//! Wallet management module

use anyhow::{Context, Result};
use solana_sdk::{
    message::VersionedMessage,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    signer::SignerError,
    transaction::VersionedTransaction,
};
use std::sync::Arc;
use zeroize::Zeroize;

/// Environment variable holding the secret key as a JSON byte array
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Wallet manager for handling the payer keypair and signing
///
/// The only holder of key material in the crate; builders hand it a message
/// and get a signed transaction back.
pub struct WalletManager {
    keypair: Arc<Keypair>,
}

impl WalletManager {
    /// Create a new wallet manager from a keypair file
    pub fn from_file(path: &str) -> Result<Self> {
        let mut keypair_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read keypair file: {}", path))?;

        let keypair = if keypair_bytes.len() == 64 {
            // Raw bytes format
            Self::keypair_from_bytes(&keypair_bytes)
        } else {
            let text = std::str::from_utf8(&keypair_bytes).context("Keypair file is not UTF-8")?;
            Self::keypair_from_json(text)
        };
        keypair_bytes.zeroize();

        Ok(Self::from_keypair(keypair?))
    }

    /// Create a wallet manager from the `WALLET_PRIVATE_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let mut raw = std::env::var(WALLET_PRIVATE_KEY_ENV)
            .with_context(|| format!("{} is not set", WALLET_PRIVATE_KEY_ENV))?;
        let keypair = Self::keypair_from_json(&raw);
        raw.zeroize();
        Ok(Self::from_keypair(keypair?))
    }

    /// Create a new wallet manager from a keypair
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    fn keypair_from_json(text: &str) -> Result<Keypair> {
        let mut bytes: Vec<u8> =
            serde_json::from_str(text.trim()).context("Failed to parse keypair JSON")?;
        let keypair = Self::keypair_from_bytes(&bytes);
        bytes.zeroize();
        keypair
    }

    fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair> {
        if bytes.len() != 64 {
            anyhow::bail!("Invalid keypair length: expected 64 bytes, got {}", bytes.len());
        }
        if bytes.iter().all(|&b| b == 0) {
            anyhow::bail!("Invalid keypair: all-zero key rejected");
        }
        Keypair::try_from(bytes).context("Invalid keypair bytes")
    }

    /// Get the public key
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Sign a compiled message as the sole signer
    pub fn sign_message(
        &self,
        message: VersionedMessage,
    ) -> std::result::Result<VersionedTransaction, SignerError> {
        VersionedTransaction::try_new(message, &[self.keypair.as_ref()])
    }
}

impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: Arc::clone(&self.keypair),
        }
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.pubkey())
            .finish()
    }
}
