//! Read-only menu

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use shared::models::Product;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(list))
        .route("/api/products/{id}", get(get_by_id))
}

async fn list(State(state): State<ServerState>) -> ApiResponse<Vec<Product>> {
    ApiResponse::success(state.catalog.list_products())
}

async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Product>> {
    state
        .catalog
        .get_product(id)
        .map(ApiResponse::success)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
                .with_detail("productId", id)
        })
}
