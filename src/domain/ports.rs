use super::cart::{CatalogItem, ItemId};
use super::checkout::Address;
use super::money::Money;
use super::order::{FetchError, Order, SessionId};
use super::payment::{PaymentAuthorityError, PaymentMetadata, TaxedPaymentIntent};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only access to the current catalog.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Returns the rows that exist for `ids`, in no particular order.
    /// Unknown ids are simply absent from the result.
    async fn get_items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<CatalogItem>>;
}

/// Read access to orders created by the payment webhook.
#[async_trait]
pub trait OrderLookup: Send + Sync {
    async fn get_order_by_session_id(&self, session_id: &SessionId) -> Result<Option<Order>>;
}

/// The external service that issues payment intents for trusted amounts.
#[async_trait]
pub trait PaymentAuthority: Send + Sync {
    async fn create_payment_intent_with_tax(
        &self,
        amount: Money,
        destination: &Address,
        metadata: &PaymentMetadata,
    ) -> std::result::Result<TaxedPaymentIntent, PaymentAuthorityError>;
}

/// Single-attempt lookup of an order by checkout session, as seen by the
/// client polling for it.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_order_by_session(
        &self,
        session_id: &SessionId,
    ) -> std::result::Result<Order, FetchError>;
}

pub type CatalogLookupRef = Arc<dyn CatalogLookup>;
pub type OrderLookupRef = Arc<dyn OrderLookup>;
pub type PaymentAuthorityRef = Arc<dyn PaymentAuthority>;
pub type OrderSourceRef = Arc<dyn OrderSource>;
