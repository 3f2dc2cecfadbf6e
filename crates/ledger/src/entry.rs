use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wolfshield_core::{
    DomainError, ExpectedTail, OrganizationId, PropertyId, ResidentId, UnitId, UserId,
};

use crate::amount::Amount;
use crate::hash;
use crate::period::AccountingPeriod;

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Closed set of ledger transaction kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Charge,
    Payment,
    Adjustment,
    Fee,
    RecertificationLog,
    MaintenanceRequest,
    MaintenanceApproval,
}

impl TransactionType {
    pub const ALL: [TransactionType; 7] = [
        TransactionType::Charge,
        TransactionType::Payment,
        TransactionType::Adjustment,
        TransactionType::Fee,
        TransactionType::RecertificationLog,
        TransactionType::MaintenanceRequest,
        TransactionType::MaintenanceApproval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Charge => "CHARGE",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Adjustment => "ADJUSTMENT",
            TransactionType::Fee => "FEE",
            TransactionType::RecertificationLog => "RECERTIFICATION_LOG",
            TransactionType::MaintenanceRequest => "MAINTENANCE_REQUEST",
            TransactionType::MaintenanceApproval => "MAINTENANCE_APPROVAL",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation("transaction_type", format!("unknown transaction type '{s}'"))
            })
    }
}

/// Payload for appending an entry (everything the caller supplies).
///
/// `created_by` is trusted as given: authentication happens before the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub organization_id: OrganizationId,
    pub property_id: PropertyId,
    pub unit_id: UnitId,
    pub tenant_id: Option<ResidentId>,
    pub transaction_type: TransactionType,
    pub amount: Amount,
    pub description: String,
    pub accounting_period: AccountingPeriod,
    pub created_by: UserId,
}

impl NewLedgerEntry {
    /// Field checks the types alone cannot express.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description", "description must not be empty"));
        }
        let chars = self.description.chars().count();
        if chars > MAX_DESCRIPTION_CHARS {
            return Err(DomainError::validation(
                "description",
                format!("description is {chars} characters (max {MAX_DESCRIPTION_CHARS})"),
            ));
        }
        if self.amount > Amount::MAX {
            return Err(DomainError::validation("amount", "amount is too large"));
        }
        Ok(())
    }
}

/// A persisted, hash-linked ledger entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub organization_id: OrganizationId,
    pub property_id: PropertyId,
    pub unit_id: UnitId,
    pub tenant_id: Option<ResidentId>,
    pub transaction_type: TransactionType,
    pub amount: Amount,
    pub description: String,
    pub accounting_period: AccountingPeriod,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Append position within the organization chain (1-based).
    pub sequence: u64,
    pub previous_hash: String,
    pub entry_hash: String,
}

impl LedgerEntry {
    /// Stamp identity and time onto a validated payload and link it to `tail`.
    ///
    /// `created_at` is truncated to microseconds so the hash survives a round trip
    /// through stores with microsecond timestamps.
    pub fn seal(
        new: NewLedgerEntry,
        id: Uuid,
        created_at: DateTime<Utc>,
        tail: &ExpectedTail,
    ) -> Self {
        let mut entry = Self {
            id,
            organization_id: new.organization_id,
            property_id: new.property_id,
            unit_id: new.unit_id,
            tenant_id: new.tenant_id,
            transaction_type: new.transaction_type,
            amount: new.amount,
            description: new.description,
            accounting_period: new.accounting_period,
            created_by: new.created_by,
            created_at: created_at.trunc_subsecs(6),
            sequence: tail.next_sequence(),
            previous_hash: tail.previous_hash().to_string(),
            entry_hash: String::new(),
        };
        entry.entry_hash = entry.compute_hash();
        entry
    }

    /// Hash of this entry's content as it is now, linked to its stored `previous_hash`.
    pub fn compute_hash(&self) -> String {
        hash::entry_hash(&hash::canonical_content(self), &self.previous_hash)
    }

    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash() == self.entry_hash
    }
}
