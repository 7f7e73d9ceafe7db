//! Price value object.
//!
//! A price is a strictly positive decimal with at most [`PRICE_SCALE`]
//! fractional digits. It is always held rescaled to exactly `PRICE_SCALE`
//! digits so that it matches the stored `NUMERIC(20, 8)` column.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{PRICE_PRECISION, PRICE_SCALE};
use crate::error::{DomainError, DomainResult};

/// Validated product price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Validate a decimal amount as a price.
    ///
    /// # Errors
    /// Returns a validation error if the amount is zero or negative, has more
    /// than `PRICE_SCALE` significant fractional digits, or does not fit the
    /// stored precision.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("Price must be a positive number"));
        }

        if amount.normalize().scale() > PRICE_SCALE {
            return Err(DomainError::validation(format!(
                "Price must have at most {} decimal places",
                PRICE_SCALE
            )));
        }

        let integer_digits = PRICE_PRECISION - PRICE_SCALE;
        if amount.trunc() >= Decimal::from(10_i64.pow(integer_digits)) {
            return Err(DomainError::validation(format!(
                "Price must have at most {} integer digits",
                integer_digits
            )));
        }

        let mut amount = amount;
        amount.rescale(PRICE_SCALE);
        Ok(Self(amount))
    }

    /// Parse and validate a price from its decimal string form.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let amount = Decimal::from_str(raw.trim())
            .map_err(|_| DomainError::validation(format!("Price '{}' is not a decimal number", raw)))?;
        Self::new(amount)
    }

    /// Get the underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Price::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Price::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
