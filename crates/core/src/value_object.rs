//! Value object trait: equality by value, not identity.

/// Marker trait for immutable, value-compared domain types.
///
/// `Amount` and `AccountingPeriod` are value objects: two amounts of 1250 minor
/// units are interchangeable. A ledger entry is not: it is known by its id.
///
/// Value objects participate in hashing, so they must also have a single stable
/// textual form.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug + core::fmt::Display {
    /// Canonical representation used wherever the value is hashed or persisted.
    fn canonical(&self) -> String {
        self.to_string()
    }
}
