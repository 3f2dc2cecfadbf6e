use wolfshield_core::{OrganizationId, PropertyId, UnitId, UserId};

use crate::{AccountingPeriod, Amount, NewLedgerEntry, TransactionType};

pub(crate) fn sample(description: &str) -> NewLedgerEntry {
    NewLedgerEntry {
        organization_id: OrganizationId::new(),
        property_id: PropertyId::new(),
        unit_id: UnitId::new(),
        tenant_id: None,
        transaction_type: TransactionType::Charge,
        amount: Amount::parse("1250.00").unwrap(),
        description: description.to_string(),
        accounting_period: AccountingPeriod::parse("2026-02").unwrap(),
        created_by: UserId::new(),
    }
}
