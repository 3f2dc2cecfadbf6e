//! Chain-tail expectations for optimistic, store-enforced appends.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// `previous_hash` of the first entry in every chain (64 hex zeros).
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// The last persisted entry of a chain, as seen by a reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTail {
    /// Append position of the tail entry (1-based).
    pub sequence: u64,
    pub entry_hash: String,
}

/// What an appender believes the chain tail to be.
///
/// The store compares this against the tail it sees inside its own atomic write;
/// a mismatch means another writer got there first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedTail {
    /// The chain must be empty.
    Genesis,
    /// The chain's last entry must be exactly this one.
    Entry(ChainTail),
}

impl ExpectedTail {
    pub fn from_tail(tail: Option<ChainTail>) -> Self {
        match tail {
            Some(t) => ExpectedTail::Entry(t),
            None => ExpectedTail::Genesis,
        }
    }

    /// Hash the next entry must link to.
    pub fn previous_hash(&self) -> &str {
        match self {
            ExpectedTail::Genesis => GENESIS_HASH,
            ExpectedTail::Entry(t) => &t.entry_hash,
        }
    }

    /// Sequence the next entry will be assigned.
    pub fn next_sequence(&self) -> u64 {
        match self {
            ExpectedTail::Genesis => 1,
            ExpectedTail::Entry(t) => t.sequence + 1,
        }
    }

    pub fn matches(&self, actual: Option<&ChainTail>) -> bool {
        match (self, actual) {
            (ExpectedTail::Genesis, None) => true,
            (ExpectedTail::Entry(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }

    pub fn check(&self, actual: Option<&ChainTail>) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "chain tail moved (expected: {self:?}, actual: {actual:?})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tail(seq: u64, hash: &str) -> ChainTail {
        ChainTail {
            sequence: seq,
            entry_hash: hash.to_string(),
        }
    }

    #[test]
    fn genesis_links_to_zero_hash() {
        let expected = ExpectedTail::from_tail(None);
        assert_eq!(expected.previous_hash(), GENESIS_HASH);
        assert_eq!(expected.next_sequence(), 1);
        assert_eq!(GENESIS_HASH.len(), 64);
    }

    #[test]
    fn stale_expectation_is_a_conflict() {
        let expected = ExpectedTail::Entry(tail(1, "aa"));
        assert!(expected.check(Some(&tail(1, "aa"))).is_ok());

        let err = expected.check(Some(&tail(2, "bb"))).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert!(ExpectedTail::Genesis.check(Some(&tail(1, "aa"))).is_err());
        assert!(expected.check(None).is_err());
    }
}
