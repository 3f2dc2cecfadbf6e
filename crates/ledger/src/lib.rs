//! Wolf Shield ledger (append-only, hash-chained compliance log).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod amount;
pub mod entry;
pub mod hash;
pub mod period;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use amount::Amount;
pub use entry::{LedgerEntry, MAX_DESCRIPTION_CHARS, NewLedgerEntry, TransactionType};
pub use period::AccountingPeriod;
pub use verify::{ChainVerifier, VerificationReport, verify_chain};
