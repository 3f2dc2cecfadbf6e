//! Ledger engine (application-level orchestration).
//!
//! ```text
//! Append:  validate → read tail → seal (id, created_at, hashes) → conditional insert
//! Period:  validate period → ordered read
//! Verify:  read tail (snapshot bound) → page through chain → ChainVerifier
//! ```
//!
//! The engine holds no state between calls. Every append re-derives the tail from
//! the store, and the store decides atomically whether that tail is still current.
//! It never retries: a `Conflict` goes back to the caller, who may retry with a
//! fresh read.

use chrono::Utc;
use thiserror::Error;
use tracing::{Span, instrument};
use uuid::Uuid;

use wolfshield_core::{DomainError, ExpectedTail, OrganizationId};
use wolfshield_ledger::{
    AccountingPeriod, ChainVerifier, LedgerEntry, NewLedgerEntry, VerificationReport,
};

use crate::ledger_store::{ChainPage, LedgerStore, LedgerStoreError};

/// Ledger engine error, as seen by callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input. Not retryable.
    #[error("validation failed for '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    /// Lost the race for the chain tail. Retrying with a fresh tail is safe.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store failed (or returned undecodable data).
    #[error("storage error: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Conflict(_) | EngineError::Storage(_))
    }
}

impl From<DomainError> for EngineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation { field, reason } => EngineError::Validation { field, reason },
            DomainError::InvalidId(msg) => EngineError::Validation {
                field: "id",
                reason: msg,
            },
            DomainError::Conflict(msg) => EngineError::Conflict(msg),
        }
    }
}

impl From<LedgerStoreError> for EngineError {
    fn from(value: LedgerStoreError) -> Self {
        match value {
            LedgerStoreError::Conflict(msg) => EngineError::Conflict(msg),
            other => EngineError::Storage(other.to_string()),
        }
    }
}

/// Append / retrieve / verify over any [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct LedgerEngine<S> {
    store: S,
    verify_page_size: u32,
}

impl<S> LedgerEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            verify_page_size: ChainPage::DEFAULT_LIMIT,
        }
    }

    /// Rows fetched per round trip while verifying.
    pub fn with_verify_page_size(mut self, size: u32) -> Self {
        self.verify_page_size = size.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> LedgerEngine<S>
where
    S: LedgerStore,
{
    /// Append one entry to its organization's chain.
    ///
    /// Either the entry is persisted with correct hashes or nothing is.
    #[instrument(
        skip(self, new),
        fields(
            organization_id = %new.organization_id,
            transaction_type = %new.transaction_type,
            entry_id = tracing::field::Empty
        ),
        err
    )]
    pub async fn append(&self, new: NewLedgerEntry) -> Result<LedgerEntry, EngineError> {
        new.validate()?;

        let tail = self.store.chain_tail(new.organization_id).await?;
        let expected = ExpectedTail::from_tail(tail);
        let entry = LedgerEntry::seal(new, Uuid::now_v7(), Utc::now(), &expected);
        Span::current().record("entry_id", tracing::field::display(entry.id));

        let stored = self.store.append(entry, expected).await?;
        tracing::info!(
            sequence = stored.sequence,
            entry_hash = %stored.entry_hash,
            "ledger entry appended"
        );
        Ok(stored)
    }

    /// Entries of `period` (default: current UTC period), in append order.
    #[instrument(skip(self), err)]
    pub async fn entries_for_period(
        &self,
        organization_id: OrganizationId,
        period: Option<AccountingPeriod>,
    ) -> Result<Vec<LedgerEntry>, EngineError> {
        let period = period.unwrap_or_else(AccountingPeriod::current);
        Ok(self.store.entries_for_period(organization_id, period).await?)
    }

    /// Walk the organization's chain and report every integrity failure.
    ///
    /// Reads a snapshot bounded by the tail seen at the start; entries appended
    /// while this runs are not examined. Memory use is one page.
    #[instrument(skip(self), err)]
    pub async fn verify(
        &self,
        organization_id: OrganizationId,
    ) -> Result<VerificationReport, EngineError> {
        let Some(tail) = self.store.chain_tail(organization_id).await? else {
            return Ok(VerificationReport::empty());
        };

        let mut verifier = ChainVerifier::new();
        let mut page = ChainPage::first(tail.sequence, self.verify_page_size);
        loop {
            let rows = self.store.scan_chain(organization_id, page).await?;
            verifier.observe_all(&rows);

            match rows.last() {
                Some(last) if rows.len() == page.limit as usize => {
                    page = page.next_after(last.sequence);
                }
                _ => break,
            }
        }

        let report = verifier.finish();
        if report.is_valid {
            tracing::info!(total_entries = report.total_entries, "ledger chain verified");
        } else {
            tracing::warn!(
                total_entries = report.total_entries,
                broken_chain_at = ?report.broken_chain_at,
                invalid_hashes = report.invalid_hashes.len(),
                "ledger integrity violation detected"
            );
        }
        Ok(report)
    }
}
