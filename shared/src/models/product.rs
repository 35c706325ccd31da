//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity
///
/// A product is either flat-priced (`price` set, no sizes) or size-priced
/// (`sizes` non-empty, `price` null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    /// Discount in percent (0-100), applied to the flat price only
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub allows_half_half: bool,
    pub category_id: i64,
    #[serde(default)]
    pub sizes: Vec<SizeVariant>,
    #[serde(default)]
    pub extras: Vec<Extra>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn is_size_priced(&self) -> bool {
        !self.sizes.is_empty()
    }

    pub fn size(&self, size_id: i64) -> Option<&SizeVariant> {
        self.sizes.iter().find(|s| s.id == size_id)
    }

    /// Size lookup by name, the matching key across products for half-half
    pub fn size_named(&self, name: &str) -> Option<&SizeVariant> {
        self.sizes.iter().find(|s| s.name == name)
    }

    pub fn extra(&self, extra_id: i64) -> Option<&Extra> {
        self.extras.iter().find(|e| e.id == extra_id)
    }
}

/// Named price tier owned by one product ("P", "M", "G")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Add-on owned by one product, priced per unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    pub id: i64,
    pub name: String,
    pub price: f64,
}
