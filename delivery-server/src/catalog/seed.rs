//! Catalog seed loader
//!
//! Reads a JSON array of products and stores them when the catalog is
//! still empty. A non-empty catalog is never overwritten.

use super::{CatalogError, CatalogResult, CatalogService};
use shared::models::Product;
use std::path::Path;

/// Load `path` into an empty catalog, returning how many products were stored
pub fn seed_if_empty(catalog: &CatalogService, path: &Path) -> CatalogResult<usize> {
    if catalog.stored_count()? > 0 {
        tracing::debug!(path = %path.display(), "Catalog not empty, skipping seed");
        return Ok(0);
    }

    let seed_error = |message: String| CatalogError::Seed {
        path: path.display().to_string(),
        message,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| seed_error(e.to_string()))?;
    let products: Vec<Product> = serde_json::from_str(&raw).map_err(|e| seed_error(e.to_string()))?;

    let count = products.len();
    for product in products {
        let id = product.id;
        catalog
            .upsert_product(product)
            .map_err(|e| seed_error(format!("product {id}: {e}")))?;
    }

    tracing::info!(count, path = %path.display(), "Catalog seeded");
    Ok(count)
}
