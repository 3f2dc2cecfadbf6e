use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use wolfshield_core::{ChainTail, ExpectedTail, OrganizationId};
use wolfshield_ledger::{AccountingPeriod, LedgerEntry};

use super::r#trait::{ChainPage, LedgerStore, LedgerStoreError, check_entry_fits};

/// In-memory append-only ledger store.
///
/// Intended for tests/dev. The tail check and the push happen under one write
/// lock, which linearizes appends within this process only.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    chains: RwLock<HashMap<OrganizationId, Vec<LedgerEntry>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tail_of(chain: &[LedgerEntry]) -> Option<ChainTail> {
        chain.last().map(|e| ChainTail {
            sequence: e.sequence,
            entry_hash: e.entry_hash.clone(),
        })
    }

    /// Edit stored rows behind the engine's back, as an attacker with table
    /// access could.
    #[cfg(test)]
    pub(crate) fn tamper_with(
        &self,
        organization_id: OrganizationId,
        edit: impl FnOnce(&mut Vec<LedgerEntry>),
    ) {
        let mut chains = self.chains.write().unwrap();
        edit(chains.entry(organization_id).or_default());
    }
}

fn poisoned() -> LedgerStoreError {
    LedgerStoreError::Storage("lock poisoned".to_string())
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn chain_tail(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<ChainTail>, LedgerStoreError> {
        let chains = self.chains.read().map_err(|_| poisoned())?;
        Ok(chains
            .get(&organization_id)
            .and_then(|chain| Self::tail_of(chain)))
    }

    async fn append(
        &self,
        entry: LedgerEntry,
        expected: ExpectedTail,
    ) -> Result<LedgerEntry, LedgerStoreError> {
        check_entry_fits(&entry, &expected)?;

        let mut chains = self.chains.write().map_err(|_| poisoned())?;
        let chain = chains.entry(entry.organization_id).or_default();

        expected
            .check(Self::tail_of(chain).as_ref())
            .map_err(|e| LedgerStoreError::Conflict(e.to_string()))?;
        if chain.iter().any(|e| e.id == entry.id) {
            return Err(LedgerStoreError::Conflict(format!(
                "entry {} already exists",
                entry.id
            )));
        }

        chain.push(entry.clone());
        Ok(entry)
    }

    async fn entries_for_period(
        &self,
        organization_id: OrganizationId,
        period: AccountingPeriod,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let chains = self.chains.read().map_err(|_| poisoned())?;
        Ok(chains
            .get(&organization_id)
            .map(|chain| {
                chain
                    .iter()
                    .filter(|e| e.accounting_period == period)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn scan_chain(
        &self,
        organization_id: OrganizationId,
        page: ChainPage,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let chains = self.chains.read().map_err(|_| poisoned())?;
        Ok(chains
            .get(&organization_id)
            .map(|chain| {
                chain
                    .iter()
                    .filter(|e| {
                        e.sequence > page.after_sequence && e.sequence <= page.through_sequence
                    })
                    .take(page.limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::testing::draft;

    fn seal(org: OrganizationId, expected: &ExpectedTail) -> LedgerEntry {
        LedgerEntry::seal(draft(org, "2026-02"), Uuid::now_v7(), Utc::now(), expected)
    }

    #[tokio::test]
    async fn append_requires_the_expected_tail() {
        let store = InMemoryLedgerStore::new();
        let org = OrganizationId::new();

        let first = store
            .append(seal(org, &ExpectedTail::Genesis), ExpectedTail::Genesis)
            .await
            .unwrap();
        let tail = store.chain_tail(org).await.unwrap().unwrap();
        assert_eq!(tail.entry_hash, first.entry_hash);

        // A second writer that also read "empty chain" must lose.
        let err = store
            .append(seal(org, &ExpectedTail::Genesis), ExpectedTail::Genesis)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerStoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn entry_must_match_the_tail_it_claims() {
        let store = InMemoryLedgerStore::new();
        let org = OrganizationId::new();
        let entry = seal(org, &ExpectedTail::Genesis);

        let wrong = ExpectedTail::Entry(ChainTail {
            sequence: 7,
            entry_hash: "a".repeat(64),
        });
        let err = store.append(entry, wrong).await.unwrap_err();
        assert!(matches!(err, LedgerStoreError::InvalidAppend(_)));
    }

    #[tokio::test]
    async fn scan_respects_bounds_and_limit() {
        let store = InMemoryLedgerStore::new();
        let org = OrganizationId::new();
        let mut expected = ExpectedTail::Genesis;
        for _ in 0..5 {
            let e = store.append(seal(org, &expected), expected.clone()).await.unwrap();
            expected = ExpectedTail::Entry(ChainTail {
                sequence: e.sequence,
                entry_hash: e.entry_hash,
            });
        }

        let page = ChainPage::first(4, 2);
        let got: Vec<u64> = store
            .scan_chain(org, page)
            .await
            .unwrap()
            .iter()
            .map(|e| e.sequence)
            .collect();
        assert_eq!(got, vec![1, 2]);

        let got: Vec<u64> = store
            .scan_chain(org, page.next_after(2))
            .await
            .unwrap()
            .iter()
            .map(|e| e.sequence)
            .collect();
        assert_eq!(got, vec![3, 4]);

        assert!(store.scan_chain(OrganizationId::new(), page).await.unwrap().is_empty());
    }
}
