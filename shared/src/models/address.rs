//! Address Model

use serde::{Deserialize, Serialize};

/// Delivery address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    /// Unix millis
    pub created_at: i64,
}

/// New address payload carried inside an order submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCreate {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

impl AddressCreate {
    pub fn into_address(self, id: i64, user_id: Option<i64>, created_at: i64) -> Address {
        Address {
            id,
            user_id,
            street: self.street,
            number: self.number,
            complement: self.complement,
            neighborhood: self.neighborhood,
            city: self.city,
            reference: self.reference,
            zip_code: self.zip_code,
            created_at,
        }
    }
}
