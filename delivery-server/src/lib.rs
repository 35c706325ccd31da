//! Delivery Server - order composition and lifecycle engine
//!
//! Backend for a single-restaurant delivery platform: prices configurable
//! cart lines, numbers and persists orders atomically, drives the order
//! status machine and streams every change to live subscribers.
//!
//! # Module structure
//!
//! ```text
//! delivery-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # staff JWT validation
//! ├── api/           # HTTP routes and WebSocket stream
//! ├── catalog/       # product cache, validation, seed loader
//! ├── pricing/       # PricingResolver
//! ├── orders/        # allocator, lifecycle, storage, manager
//! ├── message/       # EventBroadcaster
//! ├── db/            # redb tables
//! └── utils/         # logger, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod message;
pub mod orders;
pub mod pricing;
pub mod utils;

pub use auth::{JwtService, StaffUser};
pub use catalog::CatalogService;
pub use core::{Config, Server, ServerState};
pub use message::EventBroadcaster;
pub use orders::{OrderError, OrderStorage, OrdersManager};
pub use pricing::PricingResolver;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Authorization events on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
