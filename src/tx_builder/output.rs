//! Signed transaction output
//!
//! [`TxBuildOutput`] is what the builder hands to the bundle stage: a fully
//! signed transaction plus the metadata later stages need without having to
//! re-inspect the message.

use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction,
};

/// A signed swap (or tip) transaction ready for bundling
///
/// # Example
///
/// ```no_run
/// # use bundle_swap::tx_builder::TxBuildOutput;
/// # fn example(output: TxBuildOutput) {
/// println!("https://solscan.io/tx/{}", output.signature());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TxBuildOutput {
    /// The signed transaction
    pub tx: VersionedTransaction,

    /// Required signers, taken from the message header
    pub required_signers: Vec<Pubkey>,

    /// Number of address lookup tables the message was compiled against
    pub lookup_tables_used: usize,
}

impl TxBuildOutput {
    /// Wrap a signed transaction, extracting the required signers
    pub fn new(tx: VersionedTransaction, lookup_tables_used: usize) -> Self {
        let required = tx.message.header().num_required_signatures as usize;
        let required_signers = tx
            .message
            .static_account_keys()
            .iter()
            .take(required)
            .copied()
            .collect();

        Self {
            tx,
            required_signers,
            lookup_tables_used,
        }
    }

    pub fn tx_ref(&self) -> &VersionedTransaction {
        &self.tx
    }

    pub fn into_tx(self) -> VersionedTransaction {
        self.tx
    }

    /// First signature: the transaction's on-chain identity
    pub fn signature(&self) -> Signature {
        self.tx.signatures.first().copied().unwrap_or_default()
    }

    /// Blockhash the message was compiled against
    pub fn recent_blockhash(&self) -> Hash {
        *self.tx.message.recent_blockhash()
    }

    /// Whether every required signature slot carries a real signature
    pub fn is_fully_signed(&self) -> bool {
        self.tx.signatures.len() == self.required_signers.len()
            && self.tx.signatures.iter().all(|sig| *sig != Signature::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        message::{v0::Message as MessageV0, VersionedMessage},
        signature::{Keypair, Signer},
        system_instruction,
    };

    #[test]
    fn test_output_metadata() {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let blockhash = Hash::new_unique();
        let message = MessageV0::try_compile(&payer.pubkey(), &[ix], &[], blockhash).unwrap();
        let tx = VersionedTransaction::try_new(VersionedMessage::V0(message), &[&payer]).unwrap();
        let expected_sig = tx.signatures[0];

        let output = TxBuildOutput::new(tx, 0);
        assert_eq!(output.required_signers, vec![payer.pubkey()]);
        assert_eq!(output.signature(), expected_sig);
        assert_eq!(output.recent_blockhash(), blockhash);
        assert!(output.is_fully_signed());
    }
}
