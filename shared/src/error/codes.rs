//! Unified error codes for the delivery platform
//!
//! This module defines all error codes used across the server, the staff
//! dashboard and the customer pages. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / pricing errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4007,
    /// Lifecycle action not allowed from the current status
    InvalidTransition = 4010,
    /// Order status changed since the caller last saw it
    OrderStatusMismatch = 4011,
    /// Order number collided with an existing one
    OrderNumberConflict = 4012,
    /// Delivery address not found
    AddressNotFound = 4020,
    /// Neither a user nor guest name + phone supplied
    CustomerIdentityRequired = 4021,
    /// Neither an existing address nor a new address supplied
    AddressRequired = 4022,
    /// Client-side price differs from the server-resolved price
    PriceMismatch = 4030,

    // ==================== 5xxx: Payment ====================
    /// Cash change amount does not exceed the order total
    CashChangeInsufficient = 5010,
    /// Cash change fields sent with a non-cash payment
    CashChangeNotAllowed = 5011,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Product cannot be priced with the given selection
    ProductNotPriceable = 6003,
    /// Size variant not found
    SizeNotFound = 6201,
    /// Size-priced product selected without a size
    SizeRequired = 6202,
    /// Second flavor has no size with the selected size's name
    HalfHalfSizeUnmatched = 6203,
    /// Product does not allow half-half blending
    HalfHalfNotAllowed = 6204,
    /// Extra not found
    ExtraNotFound = 6301,
    /// Extra quantity outside the allowed range
    ExtraQuantityOutOfRange = 6302,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    ConfigError = 9005,

    // ==================== 94xx: Storage ====================
    StorageFull = 9401,
    StorageCorrupted = 9403,
    SystemBusy = 9404,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::RoleRequired => "Specific role is required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::InvalidTransition => "Status transition not allowed",
            ErrorCode::OrderStatusMismatch => "Order status has changed, refresh and retry",
            ErrorCode::OrderNumberConflict => "Order number already in use",
            ErrorCode::AddressNotFound => "Address not found",
            ErrorCode::CustomerIdentityRequired => "A user or guest name and phone is required",
            ErrorCode::AddressRequired => "A delivery address is required",
            ErrorCode::PriceMismatch => "Price has changed, refresh the cart",

            // Payment
            ErrorCode::CashChangeInsufficient => "Change must be for more than the order total",
            ErrorCode::CashChangeNotAllowed => "Change is only available for cash payments",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::ProductNotPriceable => "Product cannot be priced with this selection",
            ErrorCode::SizeNotFound => "Size not found",
            ErrorCode::SizeRequired => "A size must be selected for this product",
            ErrorCode::HalfHalfSizeUnmatched => "Second flavor is not available in this size",
            ErrorCode::HalfHalfNotAllowed => "Product cannot be combined half-half",
            ErrorCode::ExtraNotFound => "Extra not found",
            ErrorCode::ExtraQuantityOutOfRange => "Extra quantity is out of range",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",

            // Storage
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2002 => Ok(ErrorCode::RoleRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4010 => Ok(ErrorCode::InvalidTransition),
            4011 => Ok(ErrorCode::OrderStatusMismatch),
            4012 => Ok(ErrorCode::OrderNumberConflict),
            4020 => Ok(ErrorCode::AddressNotFound),
            4021 => Ok(ErrorCode::CustomerIdentityRequired),
            4022 => Ok(ErrorCode::AddressRequired),
            4030 => Ok(ErrorCode::PriceMismatch),

            // Payment
            5010 => Ok(ErrorCode::CashChangeInsufficient),
            5011 => Ok(ErrorCode::CashChangeNotAllowed),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6003 => Ok(ErrorCode::ProductNotPriceable),
            6201 => Ok(ErrorCode::SizeNotFound),
            6202 => Ok(ErrorCode::SizeRequired),
            6203 => Ok(ErrorCode::HalfHalfSizeUnmatched),
            6204 => Ok(ErrorCode::HalfHalfNotAllowed),
            6301 => Ok(ErrorCode::ExtraNotFound),
            6302 => Ok(ErrorCode::ExtraQuantityOutOfRange),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
