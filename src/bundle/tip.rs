//! Relay tip transaction
//!
//! Block engines only consider bundles that pay a tip to one of their tip
//! accounts. The tip rides in its own transaction after the swap and shares
//! the swap's blockhash, so both expire together.

use crate::config::RelayConfig;
use crate::errors::SwapError;
use crate::tx_builder::{sign_message, TxBuildOutput};
use crate::wallet::WalletManager;
use solana_sdk::{
    hash::Hash,
    message::{v0::Message as MessageV0, VersionedMessage},
    pubkey::Pubkey,
    system_instruction,
};
use std::str::FromStr;

/// How much to tip and to whom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipPolicy {
    pub lamports: u64,
    pub accounts: Vec<Pubkey>,
}

impl TipPolicy {
    pub fn from_config(config: &RelayConfig) -> Result<Self, SwapError> {
        let accounts = config
            .tip_accounts
            .iter()
            .map(|s| {
                Pubkey::from_str(s)
                    .map_err(|e| SwapError::Configuration(format!("tip account {}: {}", s, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            lamports: config.tip_lamports,
            accounts,
        })
    }

    /// A policy that never adds a tip transaction
    pub fn disabled() -> Self {
        Self {
            lamports: 0,
            accounts: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.lamports > 0 && !self.accounts.is_empty()
    }

    /// Pick one tip account uniformly at random
    pub fn pick_account(&self) -> Option<Pubkey> {
        if self.accounts.is_empty() {
            return None;
        }
        Some(self.accounts[fastrand::usize(..self.accounts.len())])
    }

    /// Build and sign the tip transfer, or `None` when tipping is disabled
    pub fn build_tip(
        &self,
        wallet: &WalletManager,
        blockhash: Hash,
    ) -> Result<Option<TxBuildOutput>, SwapError> {
        if !self.is_enabled() {
            return Ok(None);
        }
        let Some(tip_account) = self.pick_account() else {
            return Ok(None);
        };
        build_tip_transaction(wallet, &tip_account, self.lamports, blockhash).map(Some)
    }
}

/// Sign a system transfer of `lamports` from the payer to `tip_account`
pub fn build_tip_transaction(
    wallet: &WalletManager,
    tip_account: &Pubkey,
    lamports: u64,
    blockhash: Hash,
) -> Result<TxBuildOutput, SwapError> {
    let payer = wallet.pubkey();
    let ix = system_instruction::transfer(&payer, tip_account, lamports);
    let message = MessageV0::try_compile(&payer, &[ix], &[], blockhash)
        .map_err(|e| SwapError::TransactionBuild(format!("tip message: {}", e)))?;
    sign_message(VersionedMessage::V0(message), wallet, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;

    #[test]
    fn test_default_policy_parses_all_accounts() {
        let policy = TipPolicy::from_config(&RelayConfig::default()).unwrap();
        assert_eq!(policy.lamports, 10_000);
        assert_eq!(policy.accounts.len(), 8);

        for _ in 0..32 {
            let account = policy.pick_account().unwrap();
            assert!(policy.accounts.contains(&account));
        }
    }

    #[test]
    fn test_bad_tip_account_is_configuration_error() {
        let config = RelayConfig {
            tip_accounts: vec!["bogus".to_string()],
            ..RelayConfig::default()
        };
        assert!(matches!(
            TipPolicy::from_config(&config),
            Err(SwapError::Configuration(_))
        ));
    }

    #[test]
    fn test_tip_uses_given_blockhash() {
        let wallet = WalletManager::from_keypair(Keypair::new());
        let policy = TipPolicy::from_config(&RelayConfig::default()).unwrap();
        let blockhash = Hash::new_unique();

        let tip = policy.build_tip(&wallet, blockhash).unwrap().unwrap();
        assert_eq!(tip.recent_blockhash(), blockhash);
        assert!(tip.is_fully_signed());

        assert!(TipPolicy::disabled().build_tip(&wallet, blockhash).unwrap().is_none());
    }
}
