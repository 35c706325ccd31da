//! redb database shared by the catalog and the order engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Catalog (sizes and extras embedded) |
//! | `addresses` | `address_id` | `Address` | Delivery addresses |
//! | `orders` | `order_id` | `OrderRecord` | Order header |
//! | `order_lines` | `(order_id, position)` | `OrderLineRecord` | Frozen cart lines |
//! | `order_line_extras` | `(line_id, position)` | `OrderLineExtraRecord` | Frozen extras |
//! | `order_line_blends` | `line_id` | `OrderLineBlendRecord` | Half-half pairing |
//! | `order_numbers` | `order_number` | `order_id` | Uniqueness index |
//! | `daily_counters` | `YYYY-MM-DD` | `u64` | Last sequence issued per day |
//!
//! Values are JSON. One write transaction is one atomic unit, and redb
//! admits a single writer at a time, so every read-modify-write inside a
//! write transaction is serializable.

use redb::{Database, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

pub const ADDRESSES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("addresses");

pub const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

pub const ORDER_LINES_TABLE: TableDefinition<(i64, u32), &[u8]> =
    TableDefinition::new("order_lines");

pub const ORDER_LINE_EXTRAS_TABLE: TableDefinition<(i64, u32), &[u8]> =
    TableDefinition::new("order_line_extras");

pub const ORDER_LINE_BLENDS_TABLE: TableDefinition<i64, &[u8]> =
    TableDefinition::new("order_line_blends");

pub const ORDER_NUMBERS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("order_numbers");

pub const DAILY_COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("daily_counters");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order number already taken: {0}")]
    DuplicateOrderNumber(String),

    #[error("Referenced row missing: {0}")]
    MissingRow(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Open or create the database file and make sure every table exists
///
/// redb commits with `Durability::Immediate` by default: once `commit()`
/// returns the order is on disk.
pub fn open(path: impl AsRef<Path>) -> StorageResult<Arc<Database>> {
    let db = Database::create(path)?;
    init_tables(&db)?;
    Ok(Arc::new(db))
}

/// Open an in-memory database (tests, benchmarks)
pub fn open_in_memory() -> StorageResult<Arc<Database>> {
    let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
    init_tables(&db)?;
    Ok(Arc::new(db))
}

fn init_tables(db: &Database) -> StorageResult<()> {
    let write_txn = db.begin_write()?;
    {
        let _ = write_txn.open_table(PRODUCTS_TABLE)?;
        let _ = write_txn.open_table(ADDRESSES_TABLE)?;
        let _ = write_txn.open_table(ORDERS_TABLE)?;
        let _ = write_txn.open_table(ORDER_LINES_TABLE)?;
        let _ = write_txn.open_table(ORDER_LINE_EXTRAS_TABLE)?;
        let _ = write_txn.open_table(ORDER_LINE_BLENDS_TABLE)?;
        let _ = write_txn.open_table(ORDER_NUMBERS_TABLE)?;
        let _ = write_txn.open_table(DAILY_COUNTERS_TABLE)?;
    }
    write_txn.commit()?;
    Ok(())
}
