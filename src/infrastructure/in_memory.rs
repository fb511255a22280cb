use crate::domain::cart::{CatalogItem, ItemId};
use crate::domain::order::{Order, SessionId};
use crate::domain::ports::{CatalogLookup, OrderLookup};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory catalog.
///
/// Uses `Arc<RwLock<HashMap<ItemId, CatalogItem>>>` so clones share the same
/// rows. Suitable for tests and for serving a catalog loaded from CSV.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    items: Arc<RwLock<HashMap<ItemId, CatalogItem>>>,
}

impl InMemoryCatalog {
    /// Creates a new, empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a catalog row.
    pub async fn insert(&self, item: CatalogItem) {
        let mut items = self.items.write().await;
        items.insert(item.item_id, item);
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn get_items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<CatalogItem>> {
        let items = self.items.read().await;
        Ok(ids.iter().filter_map(|id| items.get(id)).cloned().collect())
    }
}

/// A thread-safe in-memory order store keyed by checkout session.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<SessionId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an order, as the payment webhook would.
    pub async fn insert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        orders.insert(order.session_id.clone(), order);
    }
}

#[async_trait]
impl OrderLookup for InMemoryOrderStore {
    async fn get_order_by_session_id(&self, session_id: &SessionId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(session_id).cloned())
    }
}
