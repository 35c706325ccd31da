//! Catalog read access
//!
//! Products live in redb and are served from an in-memory cache that is
//! warmed at startup and refreshed on every upsert. Pricing reads the cache
//! through [`ProductLookup`].

pub mod seed;
pub mod validation;

use crate::db::{PRODUCTS_TABLE, StorageError};
use crate::pricing::ProductLookup;
use parking_lot::RwLock;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata};
use shared::error::{AppError, ErrorCode};
use shared::models::Product;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid product: {0}")]
    Invalid(String),

    #[error("Failed to read catalog seed {path}: {message}")]
    Seed { path: String, message: String },
}

impl From<redb::TransactionError> for CatalogError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Storage(e.into())
    }
}

impl From<redb::TableError> for CatalogError {
    fn from(e: redb::TableError) -> Self {
        Self::Storage(e.into())
    }
}

impl From<redb::StorageError> for CatalogError {
    fn from(e: redb::StorageError) -> Self {
        Self::Storage(e.into())
    }
}

impl From<redb::CommitError> for CatalogError {
    fn from(e: redb::CommitError) -> Self {
        Self::Storage(e.into())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(e.into())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Storage(e) => AppError::database(e.to_string()),
            CatalogError::Invalid(msg) => AppError::with_message(ErrorCode::ProductInvalidPrice, msg),
            CatalogError::Seed { path, message } => AppError::with_message(
                ErrorCode::ConfigError,
                format!("Failed to read catalog seed {path}: {message}"),
            ),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Product catalog with a read-through cache
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<Database>,
    /// Products cache: product id -> Product (inactive included)
    products: Arc<RwLock<HashMap<i64, Product>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let products_count = self.products.read().len();
        f.debug_struct("CatalogService")
            .field("products_count", &products_count)
            .finish()
    }
}

impl CatalogService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load all products into the cache
    pub fn warmup(&self) -> CatalogResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut loaded = HashMap::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let product: Product = serde_json::from_slice(value.value())?;
            loaded.insert(key.value(), product);
        }

        let count = loaded.len();
        *self.products.write() = loaded;
        tracing::info!(count, "CatalogService: products loaded");
        Ok(count)
    }

    /// Number of stored products (active or not)
    pub fn stored_count(&self) -> CatalogResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        Ok(table.len()?)
    }

    /// Get an active product by id (from cache)
    pub fn get_product(&self, id: i64) -> Option<Product> {
        self.products.read().get(&id).filter(|p| p.is_active).cloned()
    }

    /// List active products (from cache), grouped by category
    pub fn list_products(&self) -> Vec<Product> {
        let cache = self.products.read();
        let mut products: Vec<_> = cache.values().filter(|p| p.is_active).cloned().collect();
        products.sort_by(|a, b| a.category_id.cmp(&b.category_id).then(a.id.cmp(&b.id)));
        products
    }

    /// Validate, store and cache a product
    pub fn upsert_product(&self, product: Product) -> CatalogResult<Product> {
        validation::validate_product(&product).map_err(|e| CatalogError::Invalid(e.to_string()))?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            let value = serde_json::to_vec(&product)?;
            table.insert(product.id, value.as_slice())?;
        }
        txn.commit()?;

        tracing::debug!(product_id = product.id, name = %product.name, "Product stored");
        self.products.write().insert(product.id, product.clone());
        Ok(product)
    }
}

impl ProductLookup for CatalogService {
    fn product(&self, id: i64) -> Option<Product> {
        self.get_product(id)
    }
}
