use super::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// String-to-string metadata attached to a payment intent.
///
/// Ordered so that the same checkout always produces the same metadata.
pub type PaymentMetadata = BTreeMap<String, String>;

/// A payment intent as issued by the payment authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub currency: String,
    pub metadata: PaymentMetadata,
}

/// The payment authority's answer: the intent plus the tax it computed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxedPaymentIntent {
    pub payment_intent: PaymentIntent,
    pub tax_amount: Money,
    pub total: Money,
}

/// What the checkout pipeline hands back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAuthorization {
    pub client_secret: String,
    /// Cart total before tax.
    pub amount: Money,
    pub tax_amount: Money,
    /// Cart total after tax.
    pub total: Money,
}

#[derive(Error, Debug)]
pub enum PaymentAuthorityError {
    #[error("Payment authority unreachable: {0}")]
    Unavailable(String),
    #[error("Payment authority rejected the request: {0}")]
    Rejected(String),
}
