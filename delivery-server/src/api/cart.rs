//! Cart price quotes
//!
//! `POST /api/cart/quote` prices lines exactly as a submission would,
//! without writing anything.

use axum::{Json, Router, extract::State, routing::post};
use shared::order::{QuoteRequest, QuoteResponse};

use crate::api::run_blocking;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/cart/quote", post(quote))
}

async fn quote(
    State(state): State<ServerState>,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<ApiResponse<QuoteResponse>> {
    let orders = state.orders.clone();
    let quote = run_blocking(move || orders.quote(&payload.items)).await?;
    Ok(ApiResponse::success(quote))
}
