//! Client-to-server payloads

use super::types::{LifecycleAction, OrderStatus, PaymentMethod};
use crate::models::AddressCreate;
use serde::{Deserialize, Serialize};

/// Order submission
///
/// Identity and address are kept loosely typed so that missing pieces
/// surface as specific validation errors instead of a generic JSON
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRequest {
    #[serde(default)]
    pub customer: CustomerInput,
    #[serde(default)]
    pub delivery_address: Option<AddressInput>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cash_change_requested: Option<bool>,
    #[serde(default)]
    pub cash_change_for: Option<f64>,
    #[serde(default)]
    pub items: Vec<CartLineInput>,
    #[serde(default)]
    pub delivery_fee: f64,
}

/// Either a registered user or a guest name + phone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_phone: Option<String>,
}

/// Existing address id, or a new address to store with the order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Existing(i64),
    New(AddressCreate),
}

/// One cart line as held by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_flavor_product_id: Option<i64>,
    #[serde(default)]
    pub extras: Vec<ExtraSelection>,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Unit price the client displayed; rejected when it differs from
    /// the server-resolved price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_unit_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraSelection {
    pub extra_id: i64,
    pub quantity: i32,
}

/// Lifecycle transition (staff only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub action: LifecycleAction,
    /// Reject when the order is no longer in this status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<OrderStatus>,
}

/// Price a cart without submitting it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub items: Vec<CartLineInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedLine {
    pub product_id: i64,
    pub unit_price: f64,
    pub extras_total: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub lines: Vec<QuotedLine>,
    pub items_total: f64,
}
