//! Infrastructure wiring: store selection, engine, audit sink.

use std::sync::Arc;
use std::time::Duration;

use wolfshield_infra::{
    AppConfig, AuditSink, InMemoryLedgerStore, LedgerEngine, LedgerStore, LedgerStoreError,
    PostgresLedgerStore, TracingAuditSink,
};

pub type DynLedgerStore = Arc<dyn LedgerStore>;

pub struct AppServices {
    pub engine: LedgerEngine<DynLedgerStore>,
    pub audit: Arc<dyn AuditSink>,
}

impl AppServices {
    pub fn new(store: DynLedgerStore, audit: Arc<dyn AuditSink>, verify_page_size: u32) -> Self {
        Self {
            engine: LedgerEngine::new(store).with_verify_page_size(verify_page_size),
            audit,
        }
    }

    /// In-memory store + tracing audit sink.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(TracingAuditSink),
            wolfshield_infra::ChainPage::DEFAULT_LIMIT,
        )
    }
}

/// Postgres when `DATABASE_URL` is set, otherwise in-memory.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, LedgerStoreError> {
    let store: DynLedgerStore = match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!(max_connections = config.db_max_connections, "using postgres ledger store");
            Arc::new(
                PostgresLedgerStore::connect(url, config.db_max_connections, Duration::from_secs(5))
                    .await?,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory ledger store (data is not durable)");
            Arc::new(InMemoryLedgerStore::new())
        }
    };

    Ok(AppServices::new(
        store,
        Arc::new(TracingAuditSink),
        config.verify_page_size,
    ))
}
