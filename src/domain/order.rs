use super::cart::ItemId;
use super::checkout::Address;
use super::money::Money;
use crate::error::StorefrontError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Opaque identifier of a payment-provider checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Result<Self, StorefrontError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(StorefrontError::ValidationError(
                "Session id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = StorefrontError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl FromStr for SessionId {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_id: ItemId,
    pub title: String,
    pub price: Money,
    pub quantity: u32,
}

/// An order, created by the payment webhook once the checkout session settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub session_id: SessionId,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax_amount: Money,
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
}

/// Outcome of a single failed attempt to locate an order by session.
///
/// `NotFound` is the expected transient state while the webhook has not
/// yet created the order; `Api` covers every other failure and is final.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    #[error("Order not found yet")]
    NotFound,
    #[error("Failed to load order. Please try again.")]
    Api,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_rejects_blank() {
        assert!(SessionId::new("   ").is_err());
        assert_eq!(SessionId::new(" cs_test_1 ").unwrap().as_str(), "cs_test_1");
        assert!(serde_json::from_str::<SessionId>("\"\"").is_err());
    }

    #[test]
    fn test_order_deserialization_defaults_status() {
        let json = r#"{
            "id": "2f1b7e8e-9f7a-4f53-9f3e-0d3c2b1a0f11",
            "sessionId": "cs_test_1",
            "customerName": "Ada",
            "customerEmail": "ada@example.com",
            "items": [],
            "subtotal": "0.00",
            "shippingCost": "0.00",
            "taxAmount": "0.00",
            "total": "0.00"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.session_id.as_str(), "cs_test_1");
        assert!(order.shipping_address.is_none());
    }

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(FetchError::NotFound.to_string(), "Order not found yet");
        assert_eq!(
            FetchError::Api.to_string(),
            "Failed to load order. Please try again."
        );
    }
}
