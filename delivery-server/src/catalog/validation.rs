//! Catalog consistency rules
//!
//! A product is priceable only if it is exactly one of flat-priced or
//! size-priced.

use crate::pricing::money::MAX_PRICE;
use crate::utils::validation::{MAX_NAME_LEN, TextViolation, check_required_text};
use shared::models::Product;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProductViolation {
    #[error("{0}")]
    Text(String),

    #[error("product must have either a flat price or sizes, not both")]
    PriceAndSizes,

    #[error("product must have a flat price or at least one size")]
    NoPrice,

    #[error("discount must be between 0 and 100, got {0}")]
    Discount(f64),

    #[error("{field} price must be between 0 and {MAX_PRICE}, got {price}")]
    Price { field: String, price: f64 },

    #[error("size name '{0}' is used more than once")]
    DuplicateSize(String),

    #[error("{kind} id {id} is used more than once")]
    DuplicateId { kind: &'static str, id: i64 },
}

impl From<TextViolation> for ProductViolation {
    fn from(v: TextViolation) -> Self {
        Self::Text(v.to_string())
    }
}

fn check_price(field: &str, price: f64) -> Result<(), ProductViolation> {
    if !price.is_finite() || !(0.0..=MAX_PRICE).contains(&price) {
        return Err(ProductViolation::Price {
            field: field.to_string(),
            price,
        });
    }
    Ok(())
}

pub fn validate_product(product: &Product) -> Result<(), ProductViolation> {
    check_required_text(&product.name, "name", MAX_NAME_LEN)?;

    match (product.price, product.sizes.is_empty()) {
        (Some(_), false) => return Err(ProductViolation::PriceAndSizes),
        (None, true) => return Err(ProductViolation::NoPrice),
        (Some(price), true) => check_price("flat", price)?,
        (None, false) => {}
    }

    if !product.discount_percent.is_finite() || !(0.0..=100.0).contains(&product.discount_percent) {
        return Err(ProductViolation::Discount(product.discount_percent));
    }

    let mut size_names = HashSet::new();
    let mut size_ids = HashSet::new();
    for size in &product.sizes {
        check_required_text(&size.name, "size name", MAX_NAME_LEN)?;
        check_price(&format!("size '{}'", size.name), size.price)?;
        if !size_names.insert(size.name.as_str()) {
            return Err(ProductViolation::DuplicateSize(size.name.clone()));
        }
        if !size_ids.insert(size.id) {
            return Err(ProductViolation::DuplicateId { kind: "size", id: size.id });
        }
    }

    let mut extra_ids = HashSet::new();
    for extra in &product.extras {
        check_required_text(&extra.name, "extra name", MAX_NAME_LEN)?;
        check_price(&format!("extra '{}'", extra.name), extra.price)?;
        if !extra_ids.insert(extra.id) {
            return Err(ProductViolation::DuplicateId { kind: "extra", id: extra.id });
        }
    }

    Ok(())
}
