//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shared::order::{LifecycleAction, OrderSnapshot, OrderStatus, SubmitOrderRequest, TransitionRequest};

use crate::api::run_blocking;
use crate::auth::StaffUser;
use crate::core::ServerState;
use crate::orders::TransitionOutcome;
use crate::orders::lifecycle::available_actions;
use crate::utils::time::{business_today, parse_date};
use crate::utils::{ApiResponse, AppResult};

/// Submit a new order
pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<SubmitOrderRequest>,
) -> AppResult<(StatusCode, ApiResponse<OrderSnapshot>)> {
    let orders = state.orders.clone();
    let order = run_blocking(move || orders.submit_order(payload)).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(order)))
}

/// Fetch one order, for tracking pages and dashboards reconnecting
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<OrderSnapshot>> {
    let orders = state.orders.clone();
    let order = run_blocking(move || orders.get_order(id)).await?;
    Ok(ApiResponse::success(order))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Business day, `YYYY-MM-DD`; `today` for the current one
    pub date: Option<String>,
    pub status: Option<OrderStatus>,
}

/// List orders, newest first
pub async fn list(
    State(state): State<ServerState>,
    staff: StaffUser,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<OrderSnapshot>>> {
    let date = match query.date.as_deref() {
        None => None,
        Some("today") => Some(business_today(state.orders.timezone())),
        Some(date) => Some(parse_date(date)?),
    };

    tracing::debug!(staff_id = %staff.id, ?date, status = ?query.status, "Listing orders");

    let orders = state.orders.clone();
    let list = run_blocking(move || orders.list_orders(date, query.status)).await?;
    Ok(ApiResponse::success(list))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub order: OrderSnapshot,
    pub purged: bool,
    /// Actions the order now accepts
    pub available_actions: Vec<LifecycleAction>,
}

/// Apply a lifecycle action
pub async fn transition(
    State(state): State<ServerState>,
    staff: StaffUser,
    Path(id): Path<i64>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<ApiResponse<TransitionResponse>> {
    let action = payload.action;
    let orders = state.orders.clone();
    let outcome = run_blocking(move || orders.transition(id, payload)).await?;

    tracing::info!(
        staff_id = %staff.id,
        role = %staff.role,
        order_id = id,
        action = %action,
        "Lifecycle action applied"
    );

    let response = match outcome {
        TransitionOutcome::Updated(order) => TransitionResponse {
            available_actions: available_actions(order.status),
            order,
            purged: false,
        },
        TransitionOutcome::Purged(order) => TransitionResponse {
            order,
            purged: true,
            available_actions: vec![],
        },
    };
    Ok(ApiResponse::success(response))
}
