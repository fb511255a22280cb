use crate::domain::cart::{CatalogItem, ItemId};
use crate::domain::money::Money;
use crate::error::{Result, StorefrontError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use uuid::Uuid;

/// One row of a catalog export: `item_id,title,price,stock,slug`.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    item_id: Uuid,
    title: String,
    price: Decimal,
    stock: u32,
    slug: String,
}

impl TryFrom<CatalogRecord> for CatalogItem {
    type Error = StorefrontError;

    fn try_from(record: CatalogRecord) -> Result<Self> {
        Ok(Self {
            item_id: ItemId(record.item_id),
            title: record.title,
            current_price: Money::new(record.price)?,
            available_stock: record.stock,
            slug: record.slug,
        })
    }
}

/// Reads catalog rows from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<CatalogItem>`.
/// It handles whitespace trimming automatically.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts catalog rows.
    ///
    /// A malformed row yields an `Err` without ending the iteration.
    pub fn items(self) -> impl Iterator<Item = Result<CatalogItem>> {
        self.reader
            .into_deserialize::<CatalogRecord>()
            .map(|result| -> Result<CatalogItem> { CatalogItem::try_from(result?) })
    }
}
