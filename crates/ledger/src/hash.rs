//! Canonical encoding and SHA-256 chaining for ledger entries.
//!
//! Canonical form: a compact JSON object, keys sorted lexicographically, over
//!
//! | key | value |
//! |---|---|
//! | `accountingPeriod` | `"YYYY-MM"` |
//! | `amount` | fixed two-decimal string, e.g. `"1250.00"` |
//! | `createdAt` | RFC 3339 UTC with microseconds and `Z` |
//! | `createdBy` | UUID string |
//! | `description` | string |
//! | `id` | UUID string |
//! | `organizationId` | UUID string |
//! | `propertyId` | UUID string |
//! | `tenantId` | UUID string or `null` |
//! | `transactionType` | e.g. `"RECERTIFICATION_LOG"` |
//! | `unitId` | UUID string |
//!
//! `entry_hash = lowercase_hex(SHA-256(canonical_utf8 || previous_hash_ascii))`.
//!
//! `sequence`, `previous_hash` and `entry_hash` are not part of the content: the
//! first is store-assigned, the other two are the chain itself.

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde_json::Value;
use sha2::{Digest, Sha256};

use wolfshield_core::ValueObject;

use crate::entry::LedgerEntry;

/// Deterministic canonical content of an entry (see module docs).
pub fn canonical_content(entry: &LedgerEntry) -> String {
    let mut fields: BTreeMap<&'static str, Value> = BTreeMap::new();
    fields.insert("accountingPeriod", Value::String(entry.accounting_period.canonical()));
    fields.insert("amount", Value::String(entry.amount.canonical()));
    fields.insert(
        "createdAt",
        Value::String(entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    fields.insert("createdBy", Value::String(entry.created_by.to_string()));
    fields.insert("description", Value::String(entry.description.clone()));
    fields.insert("id", Value::String(entry.id.to_string()));
    fields.insert("organizationId", Value::String(entry.organization_id.to_string()));
    fields.insert("propertyId", Value::String(entry.property_id.to_string()));
    fields.insert(
        "tenantId",
        entry
            .tenant_id
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null),
    );
    fields.insert(
        "transactionType",
        Value::String(entry.transaction_type.as_str().to_string()),
    );
    fields.insert("unitId", Value::String(entry.unit_id.to_string()));

    // Written by hand so key order never depends on serde_json's map features.
    let mut out = String::from("{");
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String((*key).to_string()).to_string());
        out.push(':');
        out.push_str(&value.to_string());
    }
    out.push('}');
    out
}

/// `hex(SHA-256(canonical || previous_hash))`.
pub fn entry_hash(canonical: &str, previous_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(previous_hash.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;
    use wolfshield_core::{
        ExpectedTail, GENESIS_HASH, OrganizationId, PropertyId, ResidentId, UnitId, UserId,
    };

    use crate::amount::Amount;
    use crate::entry::{NewLedgerEntry, TransactionType};
    use crate::period::AccountingPeriod;

    fn fixed_entry() -> LedgerEntry {
        let u = |n: u128| Uuid::from_u128(n);
        let new = NewLedgerEntry {
            organization_id: OrganizationId::from_uuid(u(1)),
            property_id: PropertyId::from_uuid(u(2)),
            unit_id: UnitId::from_uuid(u(3)),
            tenant_id: Some(ResidentId::from_uuid(u(4))),
            transaction_type: TransactionType::RecertificationLog,
            amount: Amount::parse("1250").unwrap(),
            description: "Annual \"HUD\" recert".to_string(),
            accounting_period: AccountingPeriod::parse("2026-02").unwrap(),
            created_by: UserId::from_uuid(u(5)),
        };
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        LedgerEntry::seal(new, u(6), at, &ExpectedTail::Genesis)
    }

    #[test]
    fn canonical_content_is_sorted_compact_json() {
        let entry = fixed_entry();
        let expected = concat!(
            r#"{"accountingPeriod":"2026-02","amount":"1250.00","#,
            r#""createdAt":"2026-02-01T12:00:00.000000Z","#,
            r#""createdBy":"00000000-0000-0000-0000-000000000005","#,
            r#""description":"Annual \"HUD\" recert","#,
            r#""id":"00000000-0000-0000-0000-000000000006","#,
            r#""organizationId":"00000000-0000-0000-0000-000000000001","#,
            r#""propertyId":"00000000-0000-0000-0000-000000000002","#,
            r#""tenantId":"00000000-0000-0000-0000-000000000004","#,
            r#""transactionType":"RECERTIFICATION_LOG","#,
            r#""unitId":"00000000-0000-0000-0000-000000000003"}"#,
        );
        assert_eq!(canonical_content(&entry), expected);
    }

    #[test]
    fn missing_tenant_is_null() {
        let mut entry = fixed_entry();
        entry.tenant_id = None;
        assert!(canonical_content(&entry).contains(r#""tenantId":null"#));
    }

    #[test]
    fn hash_is_lowercase_hex_sha256() {
        // SHA-256("abc")
        assert_eq!(
            entry_hash("ab", "c"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let h = fixed_entry().entry_hash;
        assert_eq!(h.len(), 64);
        assert!(h.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn previous_hash_participates() {
        let entry = fixed_entry();
        let canonical = canonical_content(&entry);
        assert_ne!(entry_hash(&canonical, GENESIS_HASH), entry_hash(&canonical, &"1".repeat(64)));
    }

    proptest! {
        #[test]
        fn hashing_is_deterministic(
            description in "[ -~]{1,80}",
            cents in 0u64..10_000_000_000,
            month in 1u8..=12,
        ) {
            let mut entry = fixed_entry();
            entry.description = description;
            entry.amount = Amount::from_minor_units(cents).unwrap();
            entry.accounting_period = AccountingPeriod::new(2026, month).unwrap();

            let a = entry_hash(&canonical_content(&entry), &entry.previous_hash);
            let b = entry.clone().compute_hash();
            prop_assert_eq!(a, b);
        }
    }
}
