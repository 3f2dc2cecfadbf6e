//! Infrastructure layer: ledger storage, engine orchestration, audit, config.

pub mod audit;
pub mod config;
pub mod engine;
pub mod ledger_store;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use config::{AppConfig, ConfigError};
pub use engine::{EngineError, LedgerEngine};
pub use ledger_store::{
    ChainPage, InMemoryLedgerStore, LedgerStore, LedgerStoreError, PostgresLedgerStore,
};
