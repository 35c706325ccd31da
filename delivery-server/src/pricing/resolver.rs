//! PricingResolver - cart selection to unit price and line total
//!
//! ```text
//! base      = size variant price        (size-priced product, size required)
//!           | flat price                (flat-priced product)
//! half-half = max(base, second flavor's same-named size price)
//! unit      = base * (1 - discount/100) (flat-priced only)
//! extras    = sum(extra.price * qty)    (never discounted)
//! line      = (unit + extras) * quantity
//! ```
//!
//! Every failure is detected before anything is persisted.

use super::money::{MAX_PRICE, apply_discount, round_money, to_decimal, to_f64, to_price};
use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::models::Product;
use shared::order::{BlendSnapshot, CartLineInput, QuotedLine};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Upper bound for a single extra's quantity on one line
pub const MAX_EXTRA_QUANTITY: i32 = 10;

/// Upper bound for a single line's quantity
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Read access to the catalog
pub trait ProductLookup {
    /// Active product by id
    fn product(&self, id: i64) -> Option<Product>;
}

impl ProductLookup for HashMap<i64, Product> {
    fn product(&self, id: i64) -> Option<Product> {
        self.get(&id).filter(|p| p.is_active).cloned()
    }
}

/// How a pricing failure should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingErrorKind {
    /// Malformed selection (bad quantity, duplicated extra)
    Validation,
    /// The catalog cannot price this selection
    Configuration,
    /// A referenced product, size or extra does not exist
    NotFound,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    #[error("Quantity must be between 1 and {MAX_LINE_QUANTITY}, got {0}")]
    InvalidQuantity(i32),

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Second flavor product {0} not found")]
    SecondFlavorNotFound(i64),

    #[error("Product '{product}' is sold by size, a size must be selected")]
    SizeRequired { product: String },

    #[error("Size {size_id} does not belong to product '{product}'")]
    SizeNotFound { product: String, size_id: i64 },

    #[error("Product '{product}' has neither a price nor sizes")]
    NotPriceable { product: String },

    #[error("Product '{product}' has an invalid {field} price of {price} (max {MAX_PRICE})")]
    InvalidPrice {
        product: String,
        field: String,
        price: f64,
    },

    #[error("Product '{product}' has an invalid discount of {percent}%")]
    InvalidDiscount { product: String, percent: f64 },

    #[error("Product '{product}' cannot be sold half-half")]
    HalfHalfNotAllowed { product: String },

    #[error("Half-half needs a size-priced product, '{product}' has a flat price")]
    HalfHalfRequiresSize { product: String },

    #[error("Second flavor '{product}' has no size named '{size_name}'")]
    HalfHalfSizeUnmatched { product: String, size_name: String },

    #[error("Extra {extra_id} does not belong to product '{product}'")]
    ExtraNotFound { product: String, extra_id: i64 },

    #[error("Extra {extra_id} quantity must be between 0 and {MAX_EXTRA_QUANTITY}, got {quantity}")]
    ExtraQuantityOutOfRange { extra_id: i64, quantity: i32 },

    #[error("Extra {0} selected more than once")]
    DuplicateExtra(i64),
}

impl PricingError {
    pub fn kind(&self) -> PricingErrorKind {
        match self {
            Self::InvalidQuantity(_)
            | Self::ExtraQuantityOutOfRange { .. }
            | Self::DuplicateExtra(_) => PricingErrorKind::Validation,
            Self::ProductNotFound(_)
            | Self::SecondFlavorNotFound(_)
            | Self::SizeNotFound { .. }
            | Self::ExtraNotFound { .. } => PricingErrorKind::NotFound,
            Self::SizeRequired { .. }
            | Self::NotPriceable { .. }
            | Self::InvalidPrice { .. }
            | Self::InvalidDiscount { .. }
            | Self::HalfHalfNotAllowed { .. }
            | Self::HalfHalfRequiresSize { .. }
            | Self::HalfHalfSizeUnmatched { .. } => PricingErrorKind::Configuration,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidQuantity(_) => ErrorCode::ValueOutOfRange,
            Self::ProductNotFound(_) | Self::SecondFlavorNotFound(_) => ErrorCode::ProductNotFound,
            Self::SizeRequired { .. } => ErrorCode::SizeRequired,
            Self::SizeNotFound { .. } => ErrorCode::SizeNotFound,
            Self::NotPriceable { .. } => ErrorCode::ProductNotPriceable,
            Self::InvalidPrice { .. } | Self::InvalidDiscount { .. } => {
                ErrorCode::ProductInvalidPrice
            }
            Self::HalfHalfNotAllowed { .. } | Self::HalfHalfRequiresSize { .. } => {
                ErrorCode::HalfHalfNotAllowed
            }
            Self::HalfHalfSizeUnmatched { .. } => ErrorCode::HalfHalfSizeUnmatched,
            Self::ExtraNotFound { .. } => ErrorCode::ExtraNotFound,
            Self::ExtraQuantityOutOfRange { .. } => ErrorCode::ExtraQuantityOutOfRange,
            Self::DuplicateExtra(_) => ErrorCode::ValidationFailed,
        }
    }
}

/// Extra with its catalog name and price frozen
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedExtra {
    pub extra_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Fully priced cart line
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub size_id: Option<i64>,
    pub size_name: Option<String>,
    pub second_flavor: Option<BlendSnapshot>,
    pub extras: Vec<ResolvedExtra>,
    pub quantity: i32,
    /// Base price after blending and discount, extras excluded
    pub unit_price: Decimal,
    /// Extras for one unit
    pub extras_total: Decimal,
    pub line_total: Decimal,
}

impl PricedLine {
    pub fn to_quoted(&self) -> QuotedLine {
        QuotedLine {
            product_id: self.product_id,
            unit_price: to_f64(self.unit_price),
            extras_total: to_f64(self.extras_total),
            line_total: to_f64(self.line_total),
        }
    }
}

/// Prices cart lines against a catalog
pub struct PricingResolver<'a, L: ProductLookup + ?Sized> {
    catalog: &'a L,
}

impl<'a, L: ProductLookup + ?Sized> PricingResolver<'a, L> {
    pub fn new(catalog: &'a L) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, line: &CartLineInput) -> Result<PricedLine, PricingError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
            return Err(PricingError::InvalidQuantity(line.quantity));
        }

        let primary = self
            .catalog
            .product(line.product_id)
            .ok_or(PricingError::ProductNotFound(line.product_id))?;

        // 1. Base price: size variant or flat price
        let (mut base, size) = if primary.is_size_priced() {
            let size_id = line.size_id.ok_or_else(|| PricingError::SizeRequired {
                product: primary.name.clone(),
            })?;
            let size = primary
                .size(size_id)
                .ok_or_else(|| PricingError::SizeNotFound {
                    product: primary.name.clone(),
                    size_id,
                })?;
            let base = catalog_price(&primary.name, &format!("size '{}'", size.name), size.price)?;
            (base, Some(size.clone()))
        } else {
            if let Some(size_id) = line.size_id {
                return Err(PricingError::SizeNotFound {
                    product: primary.name.clone(),
                    size_id,
                });
            }
            let price = primary.price.ok_or_else(|| PricingError::NotPriceable {
                product: primary.name.clone(),
            })?;
            (catalog_price(&primary.name, "flat", price)?, None)
        };

        // 2. Half-half: the higher of the two same-named sizes
        let second_flavor = match line.second_flavor_product_id {
            None => None,
            Some(second_id) => {
                let Some(size) = &size else {
                    return Err(PricingError::HalfHalfRequiresSize {
                        product: primary.name.clone(),
                    });
                };
                if !primary.allows_half_half {
                    return Err(PricingError::HalfHalfNotAllowed {
                        product: primary.name.clone(),
                    });
                }
                let second = self
                    .catalog
                    .product(second_id)
                    .ok_or(PricingError::SecondFlavorNotFound(second_id))?;
                if !second.allows_half_half {
                    return Err(PricingError::HalfHalfNotAllowed {
                        product: second.name.clone(),
                    });
                }
                let second_size = second.size_named(&size.name).ok_or_else(|| {
                    PricingError::HalfHalfSizeUnmatched {
                        product: second.name.clone(),
                        size_name: size.name.clone(),
                    }
                })?;
                let second_base = catalog_price(
                    &second.name,
                    &format!("size '{}'", second_size.name),
                    second_size.price,
                )?;
                base = base.max(second_base);
                Some(BlendSnapshot {
                    product_id: second.id,
                    product_name: second.name.clone(),
                })
            }
        };

        // 3. Discount: flat-priced products only, base price only
        let unit_price = if primary.is_size_priced() {
            round_money(base)
        } else {
            let percent = to_decimal(primary.discount_percent)
                .filter(|p| (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(p))
                .ok_or_else(|| PricingError::InvalidDiscount {
                    product: primary.name.clone(),
                    percent: primary.discount_percent,
                })?;
            round_money(apply_discount(base, percent))
        };

        // 4. Extras
        let extras = resolve_extras(&primary, line)?;
        let extras_total: Decimal = extras
            .iter()
            .map(|e| e.unit_price * Decimal::from(e.quantity))
            .sum();

        let line_total = round_money((unit_price + extras_total) * Decimal::from(line.quantity));

        Ok(PricedLine {
            product_id: primary.id,
            product_name: primary.name,
            size_id: size.as_ref().map(|s| s.id),
            size_name: size.map(|s| s.name),
            second_flavor,
            extras,
            quantity: line.quantity,
            unit_price,
            extras_total: round_money(extras_total),
            line_total,
        })
    }
}

/// A catalog price as `Decimal`, refusing anything outside `0..=MAX_PRICE`
fn catalog_price(product: &str, field: &str, price: f64) -> Result<Decimal, PricingError> {
    to_price(price).ok_or_else(|| PricingError::InvalidPrice {
        product: product.to_string(),
        field: field.to_string(),
        price,
    })
}

fn resolve_extras(product: &Product, line: &CartLineInput) -> Result<Vec<ResolvedExtra>, PricingError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(line.extras.len());
    for selection in &line.extras {
        if !seen.insert(selection.extra_id) {
            return Err(PricingError::DuplicateExtra(selection.extra_id));
        }
        if !(0..=MAX_EXTRA_QUANTITY).contains(&selection.quantity) {
            return Err(PricingError::ExtraQuantityOutOfRange {
                extra_id: selection.extra_id,
                quantity: selection.quantity,
            });
        }
        let extra = product
            .extra(selection.extra_id)
            .ok_or_else(|| PricingError::ExtraNotFound {
                product: product.name.clone(),
                extra_id: selection.extra_id,
            })?;
        if selection.quantity == 0 {
            continue;
        }
        resolved.push(ResolvedExtra {
            extra_id: extra.id,
            name: extra.name.clone(),
            quantity: selection.quantity,
            unit_price: catalog_price(&product.name, &format!("extra '{}'", extra.name), extra.price)?,
        });
    }
    Ok(resolved)
}
