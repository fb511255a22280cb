use crate::domain::cart::{CatalogItem, ItemId};
use crate::domain::order::{Order, SessionId};
use crate::domain::ports::{CatalogLookup, OrderLookup};
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for catalog rows, keyed by the item's UUID bytes.
pub const CF_CATALOG: &str = "catalog";
/// Column Family for orders, keyed by checkout session id.
pub const CF_ORDERS: &str = "orders";

/// A persistent store implementation using RocksDB.
///
/// Holds both catalog rows and orders, in separate Column Families, as JSON
/// values. Implements `CatalogLookup` and `OrderLookup`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("catalog" and "orders") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_catalog = ColumnFamilyDescriptor::new(CF_CATALOG, Options::default());
        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_catalog, cf_orders])?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Inserts or replaces a catalog row.
    pub fn put_item(&self, item: &CatalogItem) -> Result<()> {
        let cf = self.cf(CF_CATALOG)?;
        self.db
            .put_cf(cf, item.item_id.0.as_bytes(), serde_json::to_vec(item)?)?;
        Ok(())
    }

    /// Records an order under its checkout session.
    pub fn put_order(&self, order: &Order) -> Result<()> {
        let cf = self.cf(CF_ORDERS)?;
        self.db
            .put_cf(cf, order.session_id.as_str().as_bytes(), serde_json::to_vec(order)?)?;
        Ok(())
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            StorefrontError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        StorefrontError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl CatalogLookup for RocksDBStore {
    async fn get_items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<CatalogItem>> {
        let cf = self.cf(CF_CATALOG)?;
        let mut items = Vec::with_capacity(ids.len());
        for value in self
            .db
            .multi_get_cf(ids.iter().map(|id| (cf, id.0.as_bytes().to_vec())))
        {
            let value = value.map_err(|e| StorefrontError::CatalogUnavailable(e.to_string()))?;
            if let Some(bytes) = value {
                items.push(decode(&bytes)?);
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl OrderLookup for RocksDBStore {
    async fn get_order_by_session_id(&self, session_id: &SessionId) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let result = self
            .db
            .get_cf(cf, session_id.as_str().as_bytes())
            .map_err(|e| StorefrontError::OrderStoreUnavailable(e.to_string()))?;

        match result {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}
