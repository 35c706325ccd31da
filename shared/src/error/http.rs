//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::OrderNotFound
            | Self::AddressNotFound
            | Self::ProductNotFound
            | Self::SizeNotFound
            | Self::ExtraNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::InvalidTransition
            | Self::OrderStatusMismatch
            | Self::OrderNumberConflict
            | Self::PriceMismatch => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::RoleRequired => StatusCode::FORBIDDEN,

            // 422 Unprocessable (catalog cannot price the selection)
            Self::ProductInvalidPrice
            | Self::ProductNotPriceable
            | Self::SizeRequired
            | Self::HalfHalfSizeUnmatched
            | Self::HalfHalfNotAllowed => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageFull
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
