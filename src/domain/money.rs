use crate::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Largest amount a single transaction may carry.
///
/// Totals are plain `Decimal` sums; with every amount at or below this bound a
/// sum only overflows past 10^13 rows.
pub const MAX_AMOUNT: Decimal = dec!(1_000_000_000_000_000);

/// A strictly positive monetary amount, at most [`MAX_AMOUNT`].
///
/// Currency is implicit: a tenant settles in a single currency, so amounts are
/// plain decimals. Corrections are new `adjustment` transactions, never edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value <= Decimal::ZERO {
            Err(LedgerError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        } else if value > MAX_AMOUNT {
            Err(LedgerError::ValidationError(format!(
                "Amount must not exceed {}",
                MAX_AMOUNT
            )))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'a> Sum<&'a Amount> for Decimal {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, |acc, amount| acc + amount.0)
    }
}
