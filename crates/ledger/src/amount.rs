//! Currency amounts held as integer minor units.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use wolfshield_core::{DomainError, ValueObject};

const MINOR_PER_MAJOR: u64 = 100;

/// Non-negative currency amount, stored in cents.
///
/// The canonical text form always carries exactly two fractional digits
/// (`"1250.00"`), so hashing never sees floating-point noise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Largest amount a BIGINT column can hold.
    pub const MAX: Amount = Amount(i64::MAX as u64);

    pub fn from_minor_units(minor: u64) -> Result<Self, DomainError> {
        if minor > Self::MAX.0 {
            return Err(DomainError::validation("amount", "amount is too large"));
        }
        Ok(Self(minor))
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Parse a decimal string such as `"12"`, `"12.5"` or `"12.50"`.
    ///
    /// Negative values and more than two fractional digits are rejected.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let raw = input.trim();
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        let well_formed = !whole.is_empty()
            && whole.bytes().all(|b| b.is_ascii_digit())
            && frac.bytes().all(|b| b.is_ascii_digit())
            && !(digits.contains('.') && frac.is_empty());
        if !well_formed {
            return Err(DomainError::validation(
                "amount",
                format!("'{input}' is not a decimal amount"),
            ));
        }

        // Trailing zeros beyond cents are harmless ("1.500" == "1.50").
        let frac = frac.trim_end_matches('0');
        if frac.len() > 2 {
            return Err(DomainError::validation(
                "amount",
                "amount supports at most two decimal places",
            ));
        }

        let too_large = || DomainError::validation("amount", "amount is too large");
        let whole: u64 = whole.parse().map_err(|_| too_large())?;
        let cents: u64 = format!("{frac:0<2}").parse().map_err(|_| too_large())?;
        let minor = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(cents))
            .ok_or_else(too_large)?;

        if negative && minor > 0 {
            return Err(DomainError::validation("amount", "amount must not be negative"));
        }

        Self::from_minor_units(minor)
    }

    /// Parse a JSON number or string without going through `f64`.
    ///
    /// Relies on serde_json's `arbitrary_precision`: a number keeps the exact
    /// digits it was written with, so exponent forms such as `1e3` are rejected
    /// like any other non-decimal text.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, DomainError> {
        match value {
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            serde_json::Value::String(s) => Self::parse(s),
            _ => Err(DomainError::validation(
                "amount",
                "amount must be a number or decimal string",
            )),
        }
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_PER_MAJOR, self.0 % MINOR_PER_MAJOR)
    }
}

impl ValueObject for Amount {}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
