//! Monetary amounts in minor currency units.
//!
//! Amounts are stored as `i64` minor units (cents for USD), which keeps
//! addition exact and maps directly onto an INTEGER database column.
//! Decimal conversions exist for the pricing math that needs fractional
//! arithmetic (tax rates) and for display.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from converting decimal amounts into minor units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount does not fit in `i64` minor units.
    #[error("amount {0} is out of range for minor units")]
    OutOfRange(Decimal),
}

/// A monetary amount in minor currency units (e.g., cents for USD).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a money value from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn as_minor(&self) -> i64 {
        self.0
    }

    /// Convert a decimal amount into minor units, rounding to `precision`
    /// fractional digits with midpoint-away-from-zero (retail rounding).
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the rounded amount does not fit
    /// in `i64` minor units.
    pub fn from_decimal(amount: Decimal, precision: u32) -> Result<Self, MoneyError> {
        let mut rounded =
            amount.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(precision);
        i64::try_from(rounded.mantissa())
            .map(Self)
            .map_err(|_| MoneyError::OutOfRange(amount))
    }

    /// The amount as a decimal with `precision` fractional digits.
    #[must_use]
    pub fn to_decimal(&self, precision: u32) -> Decimal {
        Decimal::new(self.0, precision)
    }
}

impl fmt::Display for Money {
    /// Renders with two fractional digits, the store's display convention.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal(2))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "sqlite")]
impl ::sqlx::Type<::sqlx::Sqlite> for Money {
    fn type_info() -> <::sqlx::Sqlite as ::sqlx::Database>::TypeInfo {
        <i64 as ::sqlx::Type<::sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &<::sqlx::Sqlite as ::sqlx::Database>::TypeInfo) -> bool {
        <i64 as ::sqlx::Type<::sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Sqlite> for Money {
    fn decode(
        value: <::sqlx::Sqlite as ::sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, ::sqlx::error::BoxDynError> {
        let minor = <i64 as ::sqlx::Decode<'r, ::sqlx::Sqlite>>::decode(value)?;
        Ok(Self(minor))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> ::sqlx::Encode<'q, ::sqlx::Sqlite> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut <::sqlx::Sqlite as ::sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <i64 as ::sqlx::Encode<'q, ::sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}
