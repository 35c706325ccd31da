//! Order snapshot - the fully-resolved order
//!
//! Carries product, size, blend and extra names next to the prices frozen
//! at submission, so dashboards and tracking pages can render it without
//! further lookups.

use super::types::{OrderStatus, PaymentMethod};
use crate::models::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub id: i64,
    /// Human-facing daily number, e.g. `2026-10-18-003`
    pub order_number: String,
    pub status: OrderStatus,
    pub customer: Customer,
    pub address: Address,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cash_change_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_change_for: Option<f64>,
    pub lines: Vec<OrderLineSnapshot>,
    pub items_total: f64,
    pub delivery_fee: f64,
    pub total: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Customer {
    #[serde(rename_all = "camelCase")]
    User { user_id: i64 },
    #[serde(rename_all = "camelCase")]
    Guest { guest_name: String, guest_phone: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineSnapshot {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_flavor: Option<BlendSnapshot>,
    pub quantity: i32,
    /// Unit price frozen at submission (discount applied, extras excluded)
    pub unit_price_at_time: f64,
    pub line_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub extras: Vec<OrderLineExtraSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlendSnapshot {
    pub product_id: i64,
    pub product_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineExtraSnapshot {
    pub extra_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price_at_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_wire_format() {
        let guest = Customer::Guest {
            guest_name: "Ana".into(),
            guest_phone: "11999990000".into(),
        };
        let json = serde_json::to_value(&guest).unwrap();
        assert_eq!(json["kind"], "guest");
        assert_eq!(json["guestPhone"], "11999990000");

        let user: Customer = serde_json::from_str(r#"{"kind":"user","userId":3}"#).unwrap();
        assert_eq!(user, Customer::User { user_id: 3 });
    }
}
