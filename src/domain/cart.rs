use super::checkout::Address;
use super::money::Money;
use super::pricing::ShippingPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A client-submitted cart line. Nothing in it is trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineClaim {
    pub item_id: ItemId,
    pub claimed_title: String,
    pub claimed_price: Money,
    pub quantity: u32,
    pub slug: String,
}

/// The server-authoritative record for a sellable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub item_id: ItemId,
    pub title: String,
    pub current_price: Money,
    pub available_stock: u32,
    pub slug: String,
}

/// A cart line priced from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(rename = "id")]
    pub item_id: ItemId,
    pub title: String,
    pub price: Money,
    pub quantity: u32,
    pub slug: String,
}

impl CartLineItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// The verdict of re-pricing a cart against the catalog.
///
/// Either every claim checked out, in which case `items` holds the trusted
/// lines and the totals add up, or `errors` lists what went wrong and every
/// monetary field is zero. A partially valid cart is never partially charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedCart {
    pub is_valid: bool,
    pub items: Vec<CartLineItem>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax_amount: Money,
    pub total: Money,
    pub errors: Vec<String>,
}

impl ValidatedCart {
    /// A rejected cart: no items, zero totals.
    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            items: Vec::new(),
            subtotal: Money::ZERO,
            shipping_cost: Money::ZERO,
            tax_amount: Money::ZERO,
            total: Money::ZERO,
            errors,
        }
    }

    /// An accepted cart, with shipping priced on its subtotal. Tax is left at
    /// zero, the payment stage computes it from the destination address.
    pub fn accepted(
        items: Vec<CartLineItem>,
        shipping: &dyn ShippingPolicy,
        destination: Option<&Address>,
    ) -> Self {
        let subtotal: Money = items.iter().map(CartLineItem::line_total).sum();
        let shipping_cost = shipping.shipping_cost(subtotal, destination);
        let tax_amount = Money::ZERO;
        Self {
            is_valid: true,
            items,
            subtotal,
            shipping_cost,
            tax_amount,
            total: subtotal + shipping_cost + tax_amount,
            errors: Vec::new(),
        }
    }
}
