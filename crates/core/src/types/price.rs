//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as [`Decimal`] but travel over JSON as plain numbers,
//! so `25` stays `25` and `19.99` stays `19.99`. Form submissions deliver
//! prices as strings, which are accepted as long as they are numeric.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when a value cannot be read as a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must be numeric, got {0:?}")]
    NotNumeric(String),
}

/// A catalog price.
///
/// Non-negative by convention only; nothing here rejects a negative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a whole-unit price.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::NotNumeric(s.to_owned()));
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self)
            .map_err(|_| PriceError::NotNumeric(s.to_owned()))
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Decimal::from_f64(value)
            .map(Self)
            .ok_or_else(|| PriceError::NotNumeric(value.to_string()))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = self.0.normalize();
        if normalized.scale() == 0
            && let Some(units) = normalized.to_i64()
        {
            return serializer.serialize_i64(units);
        }
        let float = normalized
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of range"))?;
        serializer.serialize_f64(float)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Ok(Price::from_units(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Ok(Price(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        Price::try_from(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }
}
