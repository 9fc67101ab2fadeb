//! Address lookup table resolution

use crate::ledger::LedgerClient;
use futures::future::join_all;
use solana_sdk::{
    address_lookup_table::{state::AddressLookupTable, AddressLookupTableAccount},
    pubkey::Pubkey,
};
use std::str::FromStr;
use tracing::{debug, warn};

/// Fetch and decode every table the router referenced
///
/// All lookups run concurrently. Tables that cannot be resolved are logged
/// and dropped; the survivors keep the order of `addresses`. Never fails:
/// a transaction without tables is still buildable.
pub async fn resolve_lookup_tables(
    ledger: &dyn LedgerClient,
    addresses: &[String],
) -> Vec<AddressLookupTableAccount> {
    let lookups = addresses.iter().map(|address| resolve_one(ledger, address));
    let tables: Vec<_> = join_all(lookups).await.into_iter().flatten().collect();

    if !addresses.is_empty() && tables.is_empty() {
        warn!(
            requested = addresses.len(),
            "No address lookup tables could be resolved"
        );
    } else {
        debug!(
            requested = addresses.len(),
            resolved = tables.len(),
            "Address lookup tables resolved"
        );
    }

    tables
}

async fn resolve_one(ledger: &dyn LedgerClient, address: &str) -> Option<AddressLookupTableAccount> {
    let key = match Pubkey::from_str(address) {
        Ok(key) => key,
        Err(e) => {
            warn!(address = %address, error = %e, "Skipping malformed lookup table address");
            return None;
        }
    };

    let data = match ledger.get_account_data(&key).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            warn!(address = %key, "Lookup table account not found");
            return None;
        }
        Err(e) => {
            warn!(address = %key, error = %e, "Lookup table fetch failed");
            return None;
        }
    };

    decode_lookup_table(key, &data)
}

/// Decode raw lookup table account data
pub fn decode_lookup_table(key: Pubkey, data: &[u8]) -> Option<AddressLookupTableAccount> {
    match AddressLookupTable::deserialize(data) {
        Ok(table) => Some(AddressLookupTableAccount {
            key,
            addresses: table.addresses.to_vec(),
        }),
        Err(e) => {
            warn!(address = %key, error = %e, "Lookup table data could not be decoded");
            None
        }
    }
}
