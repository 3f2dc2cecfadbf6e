//! Chain integrity verification.
//!
//! [`ChainVerifier`] is incremental: it only remembers the previous entry's hash,
//! so callers can feed it one page of a very long chain at a time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wolfshield_core::GENESIS_HASH;

use crate::entry::LedgerEntry;

/// Outcome of walking an organization's chain.
///
/// A tampered chain is a normal result (`is_valid == false`), not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub is_valid: bool,
    pub total_entries: u64,
    /// 0-based position (in append order) of the first entry failing any check.
    pub broken_chain_at: Option<u64>,
    pub broken_entry_id: Option<Uuid>,
    /// Every entry whose recomputed hash differs from the stored one.
    pub invalid_hashes: Vec<Uuid>,
}

impl VerificationReport {
    pub fn empty() -> Self {
        Self {
            is_valid: true,
            total_entries: 0,
            broken_chain_at: None,
            broken_entry_id: None,
            invalid_hashes: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct ChainVerifier {
    expected_previous: String,
    position: u64,
    report: VerificationReport,
}

impl Default for ChainVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainVerifier {
    pub fn new() -> Self {
        Self {
            expected_previous: GENESIS_HASH.to_string(),
            position: 0,
            report: VerificationReport::empty(),
        }
    }

    /// Check the next entry in append order.
    pub fn observe(&mut self, entry: &LedgerEntry) {
        let linked = entry.previous_hash == self.expected_previous;
        let self_consistent = entry.has_valid_hash();

        if !self_consistent {
            self.report.invalid_hashes.push(entry.id);
        }
        if (!linked || !self_consistent) && self.report.broken_chain_at.is_none() {
            self.report.broken_chain_at = Some(self.position);
            self.report.broken_entry_id = Some(entry.id);
        }

        // Link the next entry to what is stored, so one bad row is reported once
        // rather than cascading into every successor.
        self.expected_previous.clone_from(&entry.entry_hash);
        self.position += 1;
    }

    pub fn observe_all<'a>(&mut self, entries: impl IntoIterator<Item = &'a LedgerEntry>) {
        for entry in entries {
            self.observe(entry);
        }
    }

    pub fn finish(mut self) -> VerificationReport {
        self.report.total_entries = self.position;
        self.report.is_valid =
            self.report.broken_chain_at.is_none() && self.report.invalid_hashes.is_empty();
        self.report
    }
}

/// Verify a fully loaded chain (append order).
pub fn verify_chain(entries: &[LedgerEntry]) -> VerificationReport {
    let mut verifier = ChainVerifier::new();
    verifier.observe_all(entries);
    verifier.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use wolfshield_core::{ChainTail, ExpectedTail};

    use crate::amount::Amount;
    use crate::testing::sample;

    fn build_chain(descriptions: &[&str]) -> Vec<LedgerEntry> {
        let mut tail = ExpectedTail::Genesis;
        let mut chain = Vec::new();
        for d in descriptions {
            let entry = LedgerEntry::seal(sample(d), Uuid::now_v7(), Utc::now(), &tail);
            tail = ExpectedTail::Entry(ChainTail {
                sequence: entry.sequence,
                entry_hash: entry.entry_hash.clone(),
            });
            chain.push(entry);
        }
        chain
    }

    #[test]
    fn empty_chain_is_valid() {
        assert_eq!(verify_chain(&[]), VerificationReport::empty());
    }

    #[test]
    fn untouched_chain_verifies() {
        let chain = build_chain(&["A", "B", "C"]);
        assert_eq!(chain[0].previous_hash, GENESIS_HASH);
        assert_eq!(chain[1].previous_hash, chain[0].entry_hash);
        assert_eq!(chain[2].previous_hash, chain[1].entry_hash);

        let report = verify_chain(&chain);
        assert!(report.is_valid);
        assert_eq!(report.total_entries, 3);
        assert_eq!(report.broken_chain_at, None);
        assert!(report.invalid_hashes.is_empty());
    }

    #[test]
    fn overwritten_amount_is_pinpointed() {
        let mut chain = build_chain(&["A", "B", "C"]);
        chain[1].amount = Amount::parse("0.01").unwrap();

        let report = verify_chain(&chain);
        assert!(!report.is_valid);
        assert_eq!(report.total_entries, 3);
        assert_eq!(report.broken_chain_at, Some(1));
        assert_eq!(report.broken_entry_id, Some(chain[1].id));
        assert_eq!(report.invalid_hashes, vec![chain[1].id]);
    }

    #[test]
    fn deleted_entry_breaks_the_link_after_the_gap() {
        let mut chain = build_chain(&["A", "B", "C", "D"]);
        let removed = chain.remove(1);

        let report = verify_chain(&chain);
        assert!(!report.is_valid);
        assert_eq!(report.total_entries, 3);
        assert_eq!(report.broken_chain_at, Some(1));
        assert_eq!(report.broken_entry_id, Some(chain[1].id));
        assert_ne!(report.broken_entry_id, Some(removed.id));
        assert!(report.invalid_hashes.is_empty());
    }

    #[test]
    fn deleted_first_entry_is_detected_at_genesis() {
        let mut chain = build_chain(&["A", "B"]);
        chain.remove(0);
        assert_eq!(verify_chain(&chain).broken_chain_at, Some(0));
    }

    #[test]
    fn invalid_hashes_are_collected_past_the_first_break() {
        let mut chain = build_chain(&["A", "B", "C", "D"]);
        chain[1].description = "edited".to_string();
        chain[3].description = "edited too".to_string();

        let report = verify_chain(&chain);
        assert_eq!(report.broken_chain_at, Some(1));
        assert_eq!(report.invalid_hashes, vec![chain[1].id, chain[3].id]);
    }

    #[test]
    fn paged_verification_matches_whole_chain() {
        let mut chain = build_chain(&["A", "B", "C", "D", "E"]);
        chain[3].amount = Amount::parse("9.99").unwrap();

        let mut verifier = ChainVerifier::new();
        for page in chain.chunks(2) {
            verifier.observe_all(page);
        }
        assert_eq!(verifier.finish(), verify_chain(&chain));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Every sealed chain links each entry to its predecessor's hash.
        #[test]
        fn sealed_chains_always_link(len in 1usize..12) {
            let names: Vec<String> = (0..len).map(|i| format!("entry {i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let chain = build_chain(&refs);

            for pair in chain.windows(2) {
                prop_assert_eq!(&pair[1].previous_hash, &pair[0].compute_hash());
            }
            let report = verify_chain(&chain);
            prop_assert!(report.is_valid);
            prop_assert_eq!(report.total_entries, len as u64);
        }
    }
}
