//! Postgres-backed ledger store.
//!
//! ## Linearizing appends
//!
//! `append()` runs in one transaction that:
//! 1. takes `pg_advisory_xact_lock` keyed by the organization, so concurrent
//!    appenders to the same chain queue up (other organizations are unaffected)
//! 2. re-reads the chain tail and compares it with the caller's expectation
//! 3. inserts the row
//!
//! The table additionally carries `UNIQUE (organization_id, previous_hash)` and
//! `UNIQUE (organization_id, sequence)`, so even a writer that bypasses the lock
//! cannot fork the chain.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | LedgerStoreError |
//! |------------|----------------------|------------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (check constraint violation) | `23514` | `InvalidAppend` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / PoolTimedOut / Io / other | N/A | `Storage` |

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};
use uuid::Uuid;

use wolfshield_core::{
    ChainTail, ExpectedTail, OrganizationId, PropertyId, ResidentId, UnitId, UserId,
};
use wolfshield_ledger::{AccountingPeriod, Amount, LedgerEntry, TransactionType};

use super::r#trait::{ChainPage, LedgerStore, LedgerStoreError, check_entry_fits};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS ledger_entries (
        id                UUID PRIMARY KEY,
        organization_id   UUID NOT NULL,
        property_id       UUID NOT NULL,
        unit_id           UUID NOT NULL,
        tenant_id         UUID,
        transaction_type  TEXT NOT NULL CHECK (transaction_type IN (
            'CHARGE', 'PAYMENT', 'ADJUSTMENT', 'FEE', 'RECERTIFICATION_LOG',
            'MAINTENANCE_REQUEST', 'MAINTENANCE_APPROVAL')),
        amount_cents      BIGINT NOT NULL CHECK (amount_cents >= 0),
        description       TEXT NOT NULL,
        accounting_period TEXT NOT NULL CHECK (accounting_period ~ '^\d{4}-\d{2}$'),
        created_by        UUID NOT NULL,
        created_at        TIMESTAMPTZ NOT NULL,
        sequence          BIGINT NOT NULL CHECK (sequence > 0),
        previous_hash     TEXT NOT NULL,
        entry_hash        TEXT NOT NULL,
        CONSTRAINT ledger_entries_org_sequence_key UNIQUE (organization_id, sequence),
        CONSTRAINT ledger_entries_org_previous_hash_key UNIQUE (organization_id, previous_hash)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS ledger_entries_org_period_idx
        ON ledger_entries (organization_id, accounting_period, sequence)
    "#,
];

const ENTRY_COLUMNS: &str = "id, organization_id, property_id, unit_id, tenant_id, \
     transaction_type, amount_cents, description, accounting_period, created_by, \
     created_at, sequence, previous_hash, entry_hash";

const TAIL_SQL: &str = "SELECT sequence, entry_hash FROM ledger_entries \
     WHERE organization_id = $1 ORDER BY sequence DESC LIMIT 1";

/// Postgres-backed append-only ledger store.
///
/// `Clone` is cheap (the pool is reference-counted) and the store is
/// `Send + Sync`, so one instance can be shared by every request handler.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Connect, then make sure the schema exists.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, LedgerStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, LedgerStoreError> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    async fn init_schema(&self) -> Result<(), LedgerStoreError> {
        for ddl in SCHEMA {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("init_schema", e))?;
        }
        Ok(())
    }
}

async fn read_tail(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: OrganizationId,
) -> Result<Option<ChainTail>, LedgerStoreError> {
    let row = sqlx::query(TAIL_SQL)
        .bind(organization_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("read_tail", e))?;

    row.map(|r| tail_from_row(&r)).transpose()
}

fn tail_from_row(row: &PgRow) -> Result<ChainTail, LedgerStoreError> {
    let sequence: i64 = row
        .try_get("sequence")
        .map_err(|e| LedgerStoreError::Corrupt(format!("failed to read sequence: {e}")))?;
    let entry_hash: String = row
        .try_get("entry_hash")
        .map_err(|e| LedgerStoreError::Corrupt(format!("failed to read entry_hash: {e}")))?;
    Ok(ChainTail {
        sequence: sequence as u64,
        entry_hash,
    })
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), fields(organization_id = %organization_id), err)]
    async fn chain_tail(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<ChainTail>, LedgerStoreError> {
        let row = sqlx::query(TAIL_SQL)
            .bind(organization_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("chain_tail", e))?;

        row.map(|r| tail_from_row(&r)).transpose()
    }

    #[instrument(
        skip(self, entry, expected),
        fields(
            organization_id = %entry.organization_id,
            entry_id = %entry.id,
            sequence = entry.sequence
        ),
        err
    )]
    async fn append(
        &self,
        entry: LedgerEntry,
        expected: ExpectedTail,
    ) -> Result<LedgerEntry, LedgerStoreError> {
        check_entry_fits(&entry, &expected)?;

        let sequence = i64::try_from(entry.sequence)
            .map_err(|_| LedgerStoreError::InvalidAppend("sequence overflow".to_string()))?;
        let amount_cents = i64::try_from(entry.amount.minor_units())
            .map_err(|_| LedgerStoreError::InvalidAppend("amount overflow".to_string()))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(entry.organization_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("advisory_lock", e))?;

        let current = read_tail(&mut tx, entry.organization_id).await?;
        if !expected.matches(current.as_ref()) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(LedgerStoreError::Conflict(format!(
                "expected {expected:?}, found {current:?}"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, organization_id, property_id, unit_id, tenant_id,
                transaction_type, amount_cents, description, accounting_period,
                created_by, created_at, sequence, previous_hash, entry_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(entry.id)
        .bind(entry.organization_id.as_uuid())
        .bind(entry.property_id.as_uuid())
        .bind(entry.unit_id.as_uuid())
        .bind(entry.tenant_id.map(Uuid::from))
        .bind(entry.transaction_type.as_str())
        .bind(amount_cents)
        .bind(&entry.description)
        .bind(entry.accounting_period.to_string())
        .bind(entry.created_by.as_uuid())
        .bind(entry.created_at)
        .bind(sequence)
        .bind(&entry.previous_hash)
        .bind(&entry.entry_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_entry", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(entry)
    }

    #[instrument(
        skip(self),
        fields(
            organization_id = %organization_id,
            period = %period,
            entry_count = tracing::field::Empty
        ),
        err
    )]
    async fn entries_for_period(
        &self,
        organization_id: OrganizationId,
        period: AccountingPeriod,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries \
             WHERE organization_id = $1 AND accounting_period = $2 \
             ORDER BY sequence ASC"
        ))
        .bind(organization_id.as_uuid())
        .bind(period.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("entries_for_period", e))?;

        let entries = rows
            .iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Span::current().record("entry_count", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self), fields(organization_id = %organization_id), err)]
    async fn scan_chain(
        &self,
        organization_id: OrganizationId,
        page: ChainPage,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries \
             WHERE organization_id = $1 AND sequence > $2 AND sequence <= $3 \
             ORDER BY sequence ASC \
             LIMIT $4"
        ))
        .bind(organization_id.as_uuid())
        .bind(page.after_sequence as i64)
        .bind(page.through_sequence as i64)
        .bind(i64::from(page.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("scan_chain", e))?;

        rows.iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(row: &PgRow) -> Result<LedgerEntry, LedgerStoreError> {
    fn col<'r, T>(row: &'r PgRow, name: &str) -> Result<T, LedgerStoreError>
    where
        T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        row.try_get(name)
            .map_err(|e| LedgerStoreError::Corrupt(format!("failed to read {name}: {e}")))
    }
    let corrupt = |e: wolfshield_core::DomainError| LedgerStoreError::Corrupt(e.to_string());

    let transaction_type: String = col(row, "transaction_type")?;
    let amount_cents: i64 = col(row, "amount_cents")?;
    let period: String = col(row, "accounting_period")?;
    let sequence: i64 = col(row, "sequence")?;
    let tenant_id: Option<Uuid> = col(row, "tenant_id")?;
    let created_at: DateTime<Utc> = col(row, "created_at")?;

    Ok(LedgerEntry {
        id: col(row, "id")?,
        organization_id: OrganizationId::from_uuid(col(row, "organization_id")?),
        property_id: PropertyId::from_uuid(col(row, "property_id")?),
        unit_id: UnitId::from_uuid(col(row, "unit_id")?),
        tenant_id: tenant_id.map(ResidentId::from_uuid),
        transaction_type: transaction_type.parse::<TransactionType>().map_err(corrupt)?,
        amount: u64::try_from(amount_cents)
            .map_err(|_| LedgerStoreError::Corrupt(format!("negative amount_cents {amount_cents}")))
            .and_then(|cents| Amount::from_minor_units(cents).map_err(corrupt))?,
        description: col(row, "description")?,
        accounting_period: AccountingPeriod::parse(&period).map_err(corrupt)?,
        created_by: UserId::from_uuid(col(row, "created_by")?),
        created_at,
        sequence: u64::try_from(sequence)
            .map_err(|_| LedgerStoreError::Corrupt(format!("negative sequence {sequence}")))?,
        previous_hash: col(row, "previous_hash")?,
        entry_hash: col(row, "entry_hash")?,
    })
}

/// Map SQLx errors to LedgerStoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation: another writer claimed this chain position.
                Some("23505") => LedgerStoreError::Conflict(msg),
                Some("23514") => LedgerStoreError::InvalidAppend(msg),
                _ => LedgerStoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            LedgerStoreError::Storage(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            LedgerStoreError::Storage(format!("timed out acquiring a connection in {operation}"))
        }
        _ => LedgerStoreError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}
