//! Swap transaction building
//!
//! Turns router instructions into a signed versioned transaction:
//! - **instructions**: wire decoding, ordering, compute budget prefix
//! - **lookup_tables**: concurrent address lookup table resolution
//! - **simulate**: bounded simulation producing a compute unit estimate
//! - **fees**: priority fee estimation from recent observations
//! - **builder**: V0 message compilation and signing
//! - **output**: the signed transaction handed to the bundle stage
//! - **fallback**: retry-without-lookup-tables combinator
//!
//! Key material never enters this module; signing goes through
//! [`crate::wallet::WalletManager`].

pub mod builder;
pub mod fallback;
pub mod fees;
pub mod instructions;
pub mod lookup_tables;
pub mod output;
pub mod simulate;

pub use builder::{build_swap_message, sign_message};
pub use fallback::{with_lookup_table_fallback, TablePass};
pub use fees::{compute_priority_fee, estimate_priority_fee};
pub use instructions::{
    assemble_instructions, decode_instruction, plan_swap_instructions, MAX_COMPUTE_UNIT_LIMIT,
};
pub use lookup_tables::resolve_lookup_tables;
pub use output::TxBuildOutput;
pub use simulate::{buffered_compute_units, SimulationEngine, SimulationOutcome};
