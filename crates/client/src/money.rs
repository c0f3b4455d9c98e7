use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Non-negative money amount represented as **integer cents**.
///
/// The backend stores amounts in a plain number field; conversion to and from
/// `f64` only happens at that boundary.
///
/// ```rust
/// use client::Amount;
///
/// assert_eq!("42,5".parse::<Amount>().unwrap().cents(), 4250);
/// assert_eq!(Amount::new(4250).to_string(), "42.50");
/// assert!("-1".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub const fn new(cents: u64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Value sent in the `amount` field (`42.5` for 4250 cents).
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Rounds a stored number to cents; `None` for negative or non-finite input.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let cents = (value * 100.0).round();
        (cents <= u64::MAX as f64).then(|| Self(cents as u64))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Amount {
    type Err = ClientError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator, at most two fractional digits
    /// and no sign other than a leading `+`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ClientError::Validation(format!("invalid amount '{s}': {reason}"));

        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }
        if trimmed.starts_with('-') {
            return Err(invalid("must not be negative"));
        }

        let normalized = trimmed.replace(',', ".");
        let (units, fraction) = match normalized.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (normalized.as_str(), ""),
        };

        if units.is_empty() || !units.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a number"));
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a number"));
        }

        let units: u64 = units.parse().map_err(|_| invalid("too large"))?;
        let cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid("not a number"))? * 10,
            2 => fraction.parse().map_err(|_| invalid("not a number"))?,
            _ => return Err(invalid("too many decimals")),
        };

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Amount)
            .ok_or_else(|| invalid("too large"))
    }
}
