use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier (`"<area>.<action>"`).
///
/// The wildcard `"*"` grants everything within the principal's organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission(Cow::Borrowed("*"));
    /// List entries for a period.
    pub const LEDGER_READ: Permission = Permission(Cow::Borrowed("ledger.read"));
    /// Append entries.
    pub const LEDGER_WRITE: Permission = Permission(Cow::Borrowed("ledger.write"));
    /// Run integrity verification.
    pub const LEDGER_VERIFY: Permission = Permission(Cow::Borrowed("ledger.verify"));

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
