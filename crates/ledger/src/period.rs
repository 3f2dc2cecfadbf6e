//! Accounting periods (`YYYY-MM` buckets).

use core::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use wolfshield_core::{DomainError, ValueObject};

/// A calendar month used to partition ledger entries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountingPeriod {
    year: u16,
    month: u8,
}

impl AccountingPeriod {
    pub fn new(year: u16, month: u8) -> Result<Self, DomainError> {
        if year > 9999 {
            return Err(DomainError::validation(
                "accounting_period",
                "year must have four digits",
            ));
        }
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(
                "accounting_period",
                format!("month {month:02} is out of range"),
            ));
        }
        Ok(Self { year, month })
    }

    /// Period of the given instant, in that instant's own time zone.
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self {
            year: at.year().clamp(0, 9999) as u16,
            month: at.month() as u8,
        }
    }

    /// Period of the caller's current UTC date.
    pub fn current() -> Self {
        Self::from_datetime(&Utc::now())
    }

    /// Parse a token of the exact form `YYYY-MM`.
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        let bytes = token.as_bytes();
        let shape_ok = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !shape_ok {
            return Err(DomainError::validation(
                "accounting_period",
                format!("'{token}' does not match YYYY-MM"),
            ));
        }

        // Shape check guarantees both slices are plain digits.
        let year = token[..4].parse::<u16>().unwrap_or_default();
        let month = token[5..].parse::<u8>().unwrap_or_default();
        Self::new(year, month)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }
}

impl core::fmt::Display for AccountingPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl ValueObject for AccountingPeriod {}

impl FromStr for AccountingPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountingPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountingPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::parse(&token).map_err(serde::de::Error::custom)
    }
}
