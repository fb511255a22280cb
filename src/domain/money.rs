use crate::error::StorefrontError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Number of fractional digits carried by every monetary value (cents).
pub const CURRENCY_SCALE: u32 = 2;

/// A non-negative monetary value held at cent precision.
///
/// Wraps `rust_decimal::Decimal` so that prices, subtotals and totals are
/// computed exactly. Every value is rescaled to two fractional digits on
/// construction, which makes equality a comparison of whole cents: `50`,
/// `50.0` and `50.00` are the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a monetary value, rejecting negatives and sub-cent precision.
    pub fn new(value: Decimal) -> Result<Self, StorefrontError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(StorefrontError::ValidationError(
                "Amount must not be negative".to_string(),
            ));
        }
        if value.normalize().scale() > CURRENCY_SCALE {
            return Err(StorefrontError::ValidationError(format!(
                "Amount must have at most {CURRENCY_SCALE} decimal places"
            )));
        }
        Ok(Self(at_cents(value.abs())))
    }

    /// Rounds an arbitrary decimal half away from zero to the nearest cent.
    ///
    /// Used by the pricing strategies, whose rates may produce sub-cent
    /// intermediate results.
    pub fn round_from(value: Decimal) -> Self {
        let rounded = value.round_dp_with_strategy(
            CURRENCY_SCALE,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        );
        Self(at_cents(rounded.max(Decimal::ZERO)))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The value in the smallest currency unit.
    pub fn cents(&self) -> i128 {
        self.0.mantissa()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

fn at_cents(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(CURRENCY_SCALE);
    value
}

impl TryFrom<Decimal> for Money {
    type Error = StorefrontError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(at_cents(self.0 + rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<u32> for Money {
    type Output = Self;
    fn mul(self, quantity: u32) -> Self::Output {
        Self(at_cents(self.0 * Decimal::from(quantity)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}
