//! Cart line pricing
//!
//! [`PricingResolver`] turns a client-held cart line into a frozen unit
//! price and line total using the current catalog. It is a pure function
//! over a [`ProductLookup`]; nothing here touches storage.

pub mod money;
pub mod resolver;

pub use resolver::{
    MAX_EXTRA_QUANTITY, MAX_LINE_QUANTITY, PricedLine, PricingError, PricingErrorKind,
    PricingResolver, ProductLookup, ResolvedExtra,
};
