//! Data models
//!
//! Catalog and address entities shared between the delivery server and
//! its clients. All IDs are `i64` snowflakes (see [`crate::util::snowflake_id`]).

pub mod address;
pub mod product;

// Re-exports
pub use address::*;
pub use product::*;
