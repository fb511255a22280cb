use thiserror::Error;

/// Infrastructure failures surfaced by the storage and client adapters.
///
/// Business-rule violations (price drift, stock shortfalls, missing items)
/// are never represented here; they travel as data inside a `ValidatedCart`.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Order store unavailable: {0}")]
    OrderStoreUnavailable(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
