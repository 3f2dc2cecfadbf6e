//! Append-only ledger store boundary.
//!
//! Defines the persistence abstraction the ledger engine runs against, plus an
//! in-memory implementation (tests/dev) and a Postgres implementation.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use r#trait::{ChainPage, LedgerStore, LedgerStoreError};
