//! Utility module - logging, input validation, business time
//!
//! Error types are re-exported from `shared::error` so handlers only need
//! `crate::utils::{AppError, AppResult}`.

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
