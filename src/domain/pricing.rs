//! Pluggable shipping and tax strategies.
//!
//! Both are pure and deterministic: the same subtotal and destination always
//! price the same way.

use super::checkout::Address;
use super::money::Money;
use rust_decimal::Decimal;

pub trait ShippingPolicy: Send + Sync {
    /// Shipping charged for a cart with the given subtotal.
    ///
    /// `destination` is `None` when a cart is priced before the customer has
    /// entered an address.
    fn shipping_cost(&self, subtotal: Money, destination: Option<&Address>) -> Money;
}

pub trait TaxPolicy: Send + Sync {
    /// Tax owed on `amount` when shipped to `destination`.
    fn tax_for(&self, amount: Money, destination: &Address) -> Money;
}

/// One shipping rate for every order, optionally waived above a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRateShipping {
    pub rate: Money,
    pub free_over: Option<Money>,
}

impl FlatRateShipping {
    pub fn new(rate: Money) -> Self {
        Self {
            rate,
            free_over: None,
        }
    }

    pub fn with_free_shipping_over(mut self, threshold: Money) -> Self {
        self.free_over = Some(threshold);
        self
    }
}

impl ShippingPolicy for FlatRateShipping {
    fn shipping_cost(&self, subtotal: Money, _destination: Option<&Address>) -> Money {
        match self.free_over {
            Some(threshold) if subtotal >= threshold => Money::ZERO,
            _ => self.rate,
        }
    }
}

/// Subtotal bands, each with its own rate.
///
/// A band applies from its `from` subtotal (inclusive) up to the next band.
/// Subtotals below the first band pay the first band's rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TieredShipping {
    tiers: Vec<ShippingTier>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingTier {
    pub from: Money,
    pub cost: Money,
}

impl TieredShipping {
    pub fn new(mut tiers: Vec<ShippingTier>) -> Self {
        tiers.sort_by_key(|tier| tier.from);
        Self { tiers }
    }
}

impl ShippingPolicy for TieredShipping {
    fn shipping_cost(&self, subtotal: Money, _destination: Option<&Address>) -> Money {
        self.tiers
            .iter()
            .rev()
            .find(|tier| subtotal >= tier.from)
            .or_else(|| self.tiers.first())
            .map(|tier| tier.cost)
            .unwrap_or(Money::ZERO)
    }
}

/// A single percentage applied regardless of destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRateTax {
    /// Fraction, e.g. `0.08` for 8%.
    pub rate: Decimal,
}

impl TaxPolicy for FlatRateTax {
    fn tax_for(&self, amount: Money, _destination: &Address) -> Money {
        Money::round_from(amount.value() * self.rate)
    }
}
