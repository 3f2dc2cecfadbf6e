//! Wire shapes (camelCase JSON) and their mapping to ledger types.
//!
//! Identifiers and enums arrive as plain strings, and required fields as
//! `Option`s, so a malformed or missing value becomes a field-named 400 rather
//! than a generic body rejection.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wolfshield_core::{DomainError, OrganizationId, PropertyId, ResidentId, UnitId, UserId};
use wolfshield_ledger::{AccountingPeriod, Amount, LedgerEntry, NewLedgerEntry, TransactionType};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendEntryRequest {
    /// Defaults to the token's organization.
    pub organization_id: Option<String>,
    pub property_id: Option<String>,
    pub unit_id: Option<String>,
    pub tenant_id: Option<String>,
    pub transaction_type: Option<String>,
    /// Number or decimal string; parsed without going through `f64`.
    pub amount: Option<serde_json::Value>,
    pub description: Option<String>,
    /// Defaults to the current UTC period.
    pub accounting_period: Option<String>,
}

impl AppendEntryRequest {
    /// Validate and convert for an already resolved and authorized
    /// `organization_id`. `created_by` always comes from the verified token.
    pub fn into_new_entry(
        self,
        organization_id: OrganizationId,
        created_by: UserId,
    ) -> Result<NewLedgerEntry, DomainError> {
        let property_id = required("property_id", self.property_id)?;
        let unit_id = required("unit_id", self.unit_id)?;
        let transaction_type = required("transaction_type", self.transaction_type)?;
        let amount = required("amount", self.amount)?;
        let description = required("description", self.description)?;

        let tenant_id = match self.tenant_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_id("tenant_id", raw, ResidentId::from_uuid)?),
            _ => None,
        };
        let accounting_period = match self.accounting_period {
            Some(raw) => AccountingPeriod::parse(raw.trim())?,
            None => AccountingPeriod::current(),
        };

        let new = NewLedgerEntry {
            organization_id,
            property_id: parse_id("property_id", &property_id, PropertyId::from_uuid)?,
            unit_id: parse_id("unit_id", &unit_id, UnitId::from_uuid)?,
            tenant_id,
            transaction_type: TransactionType::from_str(transaction_type.trim())?,
            amount: Amount::from_json(&amount)?,
            description,
            accounting_period,
            created_by,
        };
        new.validate()?;
        Ok(new)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesQuery {
    pub organization_id: Option<String>,
    pub accounting_period: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub organization_id: Option<String>,
}

pub fn parse_organization(
    raw: Option<&str>,
    default_organization: OrganizationId,
) -> Result<OrganizationId, DomainError> {
    match raw {
        Some(raw) => parse_id("organization_id", raw, OrganizationId::from_uuid),
        None => Ok(default_organization),
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, DomainError> {
    value.ok_or_else(|| DomainError::validation(field, "is required"))
}

fn parse_id<T>(
    field: &'static str,
    raw: &str,
    wrap: impl FnOnce(Uuid) -> T,
) -> Result<T, DomainError> {
    Uuid::parse_str(raw.trim())
        .map(wrap)
        .map_err(|e| DomainError::validation(field, format!("invalid UUID: {e}")))
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryDto {
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
    pub sequence: u64,
    pub previous_hash: String,
    pub entry_hash: String,
}

impl From<LedgerEntry> for LedgerEntryDto {
    fn from(e: LedgerEntry) -> Self {
        Self {
            id: e.id,
            organization_id: e.organization_id,
            property_id: e.property_id,
            unit_id: e.unit_id,
            tenant_id: e.tenant_id,
            transaction_type: e.transaction_type,
            amount: e.amount,
            description: e.description,
            accounting_period: e.accounting_period,
            created_by: e.created_by,
            created_at: e.created_at,
            sequence: e.sequence,
            previous_hash: e.previous_hash,
            entry_hash: e.entry_hash,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesResponse {
    pub entries: Vec<LedgerEntryDto>,
    pub count: usize,
    pub accounting_period: AccountingPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> AppendEntryRequest {
        serde_json::from_value(body).unwrap()
    }

    fn body() -> serde_json::Value {
        json!({
            "propertyId": Uuid::now_v7().to_string(),
            "unitId": Uuid::now_v7().to_string(),
            "transactionType": "PAYMENT",
            "amount": "950.5",
            "description": "March rent",
            "accountingPeriod": "2026-03",
        })
    }

    #[test]
    fn maps_wire_fields() {
        let org = OrganizationId::new();
        let who = UserId::new();
        let new = request(body()).into_new_entry(org, who).unwrap();
        assert_eq!(new.organization_id, org);
        assert_eq!(new.created_by, who);
        assert_eq!(new.tenant_id, None);
        assert_eq!(new.transaction_type, TransactionType::Payment);
        assert_eq!(new.amount.minor_units(), 95_050);
        assert_eq!(new.accounting_period.to_string(), "2026-03");
    }

    #[test]
    fn errors_name_the_offending_field() {
        let cases = [
            ("amount", json!(-0.01)),
            ("unitId", json!("not-a-uuid")),
            ("transactionType", json!("REFUND")),
            ("accountingPeriod", json!("2026-13")),
            ("description", json!("   ")),
        ];
        for (key, value) in cases {
            let mut b = body();
            b[key] = value;
            let err = request(b)
                .into_new_entry(OrganizationId::new(), UserId::new())
                .unwrap_err();
            let field = err.field().unwrap();
            assert_eq!(crate::app::errors::wire_field(field), key);
        }
    }

    #[test]
    fn missing_required_fields_are_named() {
        for key in ["propertyId", "unitId", "transactionType", "amount", "description"] {
            let mut b = body();
            b.as_object_mut().unwrap().remove(key);
            let err = request(b)
                .into_new_entry(OrganizationId::new(), UserId::new())
                .unwrap_err();
            assert_eq!(crate::app::errors::wire_field(err.field().unwrap()), key);
        }

        let mut b = body();
        b["amount"] = serde_json::Value::Null;
        let err = request(b)
            .into_new_entry(OrganizationId::new(), UserId::new())
            .unwrap_err();
        assert_eq!(err.field(), Some("amount"));
    }
}
