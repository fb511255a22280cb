#![allow(dead_code)]

use axum::Router;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use storefront::application::cart_validator::CartValidator;
use storefront::application::checkout::CheckoutIntentBuilder;
use storefront::domain::cart::{CartLineClaim, CatalogItem, ItemId};
use storefront::domain::money::Money;
use storefront::domain::order::{Order, OrderItem, OrderStatus, SessionId};
use storefront::domain::pricing::{FlatRateShipping, FlatRateTax};
use storefront::infrastructure::in_memory::{InMemoryCatalog, InMemoryOrderStore};
use storefront::infrastructure::simulated_payments::SimulatedPaymentAuthority;
use storefront::interfaces::http::{AppState, router};
use uuid::Uuid;

pub const ARTWORK_ID: &str = "6f1c2a9e-5b7d-4c3e-9a8f-1d2e3f4a5b6c";
pub const SOLD_OUT_ID: &str = "0b9d7c1e-2a3f-4e5d-8c7b-6a5f4e3d2c1b";

pub fn money(value: Decimal) -> Money {
    Money::new(value).unwrap()
}

pub fn item_id(value: &str) -> ItemId {
    ItemId(Uuid::parse_str(value).unwrap())
}

pub fn catalog_item(id: &str, title: &str, price: Decimal, stock: u32) -> CatalogItem {
    CatalogItem {
        item_id: item_id(id),
        title: title.to_string(),
        current_price: money(price),
        available_stock: stock,
        slug: title.to_lowercase().replace(' ', "-"),
    }
}

pub fn claim(item: &CatalogItem, price: Decimal, quantity: u32) -> CartLineClaim {
    CartLineClaim {
        item_id: item.item_id,
        claimed_title: item.title.clone(),
        claimed_price: money(price),
        quantity,
        slug: item.slug.clone(),
    }
}

/// "Test Artwork" at 50.00 with 10 in stock and a sold-out item at 75.00.
pub async fn seeded_catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog
        .insert(catalog_item(ARTWORK_ID, "Test Artwork", dec!(50), 10))
        .await;
    catalog
        .insert(catalog_item(SOLD_OUT_ID, "Out of Stock Item", dec!(75), 0))
        .await;
    catalog
}

pub fn paid_order(session_id: &str) -> Order {
    Order {
        id: Uuid::new_v4(),
        session_id: SessionId::new(session_id).unwrap(),
        customer_name: "Ada Lovelace".to_string(),
        customer_email: "ada@example.com".to_string(),
        status: OrderStatus::Paid,
        items: vec![OrderItem {
            item_id: item_id(ARTWORK_ID),
            title: "Test Artwork".to_string(),
            price: money(dec!(50)),
            quantity: 2,
        }],
        subtotal: money(dec!(100)),
        shipping_cost: money(dec!(5)),
        tax_amount: Money::ZERO,
        total: money(dec!(105)),
        shipping_address: None,
    }
}

/// A router over in-memory stores, 5.00 flat shipping and the given tax rate.
pub async fn test_app(orders: InMemoryOrderStore, tax_rate: Decimal) -> Router {
    let validator = Arc::new(CartValidator::new(
        Arc::new(seeded_catalog().await),
        Arc::new(FlatRateShipping::new(money(dec!(5)))),
    ));
    let payments = Arc::new(SimulatedPaymentAuthority::new(
        Arc::new(FlatRateTax { rate: tax_rate }),
        "usd",
    ));
    let checkout = Arc::new(CheckoutIntentBuilder::new(validator.clone(), payments));

    router(AppState {
        validator,
        checkout,
        orders: Arc::new(orders),
    })
}

pub fn address_json() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada Lovelace",
        "line1": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postalCode": "62701",
        "country": "us"
    })
}
