use wolfshield_core::{OrganizationId, PropertyId, ResidentId, UnitId, UserId};
use wolfshield_ledger::{AccountingPeriod, Amount, NewLedgerEntry, TransactionType};

/// A valid rent-charge draft for `organization_id` in `period` ("YYYY-MM").
pub(crate) fn draft(organization_id: OrganizationId, period: &str) -> NewLedgerEntry {
    NewLedgerEntry {
        organization_id,
        property_id: PropertyId::new(),
        unit_id: UnitId::new(),
        tenant_id: Some(ResidentId::new()),
        transaction_type: TransactionType::Charge,
        amount: Amount::parse("1250.00").unwrap(),
        description: "Monthly rent".to_string(),
        accounting_period: AccountingPeriod::parse(period).unwrap(),
        created_by: UserId::new(),
    }
}
