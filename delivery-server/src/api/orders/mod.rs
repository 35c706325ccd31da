//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | POST | public |
//! | /api/orders | GET | staff |
//! | /api/orders/{id} | GET | public |
//! | /api/orders/{id}/transition | POST | staff |
//! | /api/orders/live | GET (WebSocket) | public |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::live;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::submit).get(handler::list))
        .route("/live", get(live::handle_live_ws))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/transition", post(handler::transition))
}
