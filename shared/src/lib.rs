//! Shared types for the delivery ordering platform
//!
//! Wire contracts used by the server, the staff dashboard and the
//! customer tracking page: catalog models, order snapshots and events,
//! submission/transition payloads and the unified error system.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use order::{OrderEvent, OrderEventType, OrderSnapshot, OrderStatus};
