use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wolfshield_core::{ChainTail, ExpectedTail, OrganizationId};
use wolfshield_ledger::{AccountingPeriod, LedgerEntry};

/// A bounded window over an organization chain, in append order.
///
/// `through_sequence` pins the upper bound so a multi-page scan sees one
/// point-in-time snapshot even while appends continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPage {
    /// Exclusive lower bound (0 = from the first entry).
    pub after_sequence: u64,
    /// Inclusive upper bound.
    pub through_sequence: u64,
    pub limit: u32,
}

impl ChainPage {
    pub const DEFAULT_LIMIT: u32 = 500;

    pub fn first(through_sequence: u64, limit: u32) -> Self {
        Self {
            after_sequence: 0,
            through_sequence,
            limit: limit.clamp(1, 10_000),
        }
    }

    pub fn next_after(self, last_sequence: u64) -> Self {
        Self {
            after_sequence: last_sequence,
            ..self
        }
    }
}

/// Ledger store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors (validation).
///
/// - **Conflict**: another writer moved the chain tail first (retryable)
/// - **InvalidAppend**: the entry does not fit the tail it claims to extend
/// - **Corrupt**: a persisted row could not be decoded
/// - **Storage**: backend unreachable, timed out, or otherwise failed
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    #[error("chain tail conflict: {0}")]
    Conflict(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("corrupt ledger row: {0}")]
    Corrupt(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Durable, append-only store of ledger entries, one chain per organization.
///
/// ## Append Semantics
///
/// `append()` is a conditional insert: it must re-read the organization's tail
/// inside the same atomic operation as the write and reject the entry with
/// `Conflict` unless that tail equals `expected`. At most one entry may ever
/// claim a given `previous_hash` within an organization. A store shared by
/// several processes must enforce this in the backend, not with in-process locks.
///
/// ## Read Semantics
///
/// Reads are ordered by `sequence` (append order) and never mutate. Stores
/// never cache entries across calls.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Last entry of the organization chain, if any.
    async fn chain_tail(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<ChainTail>, LedgerStoreError>;

    /// Persist `entry` iff the chain tail still matches `expected`.
    async fn append(
        &self,
        entry: LedgerEntry,
        expected: ExpectedTail,
    ) -> Result<LedgerEntry, LedgerStoreError>;

    /// All entries of one accounting period, in append order.
    async fn entries_for_period(
        &self,
        organization_id: OrganizationId,
        period: AccountingPeriod,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError>;

    /// One page of the chain, in append order.
    async fn scan_chain(
        &self,
        organization_id: OrganizationId,
        page: ChainPage,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn chain_tail(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<ChainTail>, LedgerStoreError> {
        (**self).chain_tail(organization_id).await
    }

    async fn append(
        &self,
        entry: LedgerEntry,
        expected: ExpectedTail,
    ) -> Result<LedgerEntry, LedgerStoreError> {
        (**self).append(entry, expected).await
    }

    async fn entries_for_period(
        &self,
        organization_id: OrganizationId,
        period: AccountingPeriod,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        (**self).entries_for_period(organization_id, period).await
    }

    async fn scan_chain(
        &self,
        organization_id: OrganizationId,
        page: ChainPage,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        (**self).scan_chain(organization_id, page).await
    }
}

/// Consistency checks every store applies before writing.
pub(crate) fn check_entry_fits(
    entry: &LedgerEntry,
    expected: &ExpectedTail,
) -> Result<(), LedgerStoreError> {
    if entry.previous_hash != expected.previous_hash() {
        return Err(LedgerStoreError::InvalidAppend(format!(
            "entry {} links to {} but expected tail hash is {}",
            entry.id,
            entry.previous_hash,
            expected.previous_hash()
        )));
    }
    if entry.sequence != expected.next_sequence() {
        return Err(LedgerStoreError::InvalidAppend(format!(
            "entry {} has sequence {} but next sequence is {}",
            entry.id,
            entry.sequence,
            expected.next_sequence()
        )));
    }
    Ok(())
}
