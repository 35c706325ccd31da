use crate::db::StorageError;
use crate::orders::lifecycle::LifecycleError;
use crate::pricing::{PricingError, PricingErrorKind};
use shared::error::{AppError, ErrorCode};
use shared::order::OrderStatus;
use std::fmt;
use thiserror::Error;

/// Referenced entity kinds for not-found errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Order,
    Address,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Order => f.write_str("Order"),
            Resource::Address => f.write_str("Address"),
        }
    }
}

/// Engine error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Concurrency,
    NotFound,
    State,
    Persistence,
}

/// Order engine errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{message}")]
    Validation { code: ErrorCode, message: String },

    #[error("Item {line}: {source}")]
    Pricing {
        line: usize,
        #[source]
        source: PricingError,
    },

    #[error("Item {line}: price changed from {expected:.2} to {actual:.2}")]
    PriceMismatch { line: usize, expected: f64, actual: f64 },

    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },

    #[error(transparent)]
    State(#[from] LifecycleError),

    #[error("Order {order_id} is {actual}, expected {expected}")]
    StatusMismatch {
        order_id: i64,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    #[error("Order number {0} was already issued")]
    Concurrency(String),

    #[error("Storage error: {0}")]
    Persistence(StorageError),
}

pub type ManagerResult<T> = Result<T, OrderError>;

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateOrderNumber(number) => OrderError::Concurrency(number),
            other => OrderError::Persistence(other),
        }
    }
}

macro_rules! storage_from {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for OrderError {
            fn from(err: $ty) -> Self {
                OrderError::Persistence(err.into())
            }
        })*
    };
}

storage_from!(
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

impl OrderError {
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        OrderError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: Resource, id: i64) -> Self {
        OrderError::NotFound { resource, id }
    }

    /// Pricing failure on the `index`-th submitted item (0-based)
    pub fn pricing(index: usize, source: PricingError) -> Self {
        OrderError::Pricing {
            line: index + 1,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::Validation { .. } | OrderError::PriceMismatch { .. } => ErrorKind::Validation,
            OrderError::Pricing { source, .. } => match source.kind() {
                PricingErrorKind::Validation => ErrorKind::Validation,
                PricingErrorKind::Configuration => ErrorKind::Configuration,
                PricingErrorKind::NotFound => ErrorKind::NotFound,
            },
            OrderError::NotFound { .. } => ErrorKind::NotFound,
            OrderError::State(_) | OrderError::StatusMismatch { .. } => ErrorKind::State,
            OrderError::Concurrency(_) => ErrorKind::Concurrency,
            OrderError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::Validation { code, .. } => *code,
            OrderError::Pricing { source, .. } => source.code(),
            OrderError::PriceMismatch { .. } => ErrorCode::PriceMismatch,
            OrderError::NotFound { resource: Resource::Order, .. } => ErrorCode::OrderNotFound,
            OrderError::NotFound { resource: Resource::Address, .. } => ErrorCode::AddressNotFound,
            OrderError::State(_) => ErrorCode::InvalidTransition,
            OrderError::StatusMismatch { .. } => ErrorCode::OrderStatusMismatch,
            OrderError::Concurrency(_) => ErrorCode::OrderNumberConflict,
            OrderError::Persistence(e) => classify_storage_error(e),
        }
    }
}

/// Map a storage failure to an error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) | StorageError::MissingRow(_) => {
            return ErrorCode::StorageCorrupted;
        }
        StorageError::DuplicateOrderNumber(_) => return ErrorCode::OrderNumberConflict,
        _ => {}
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    // Database/Transaction/Table/Storage/Commit: transient
    ErrorCode::SystemBusy
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let app = AppError::with_message(code, message);

        match err {
            OrderError::Pricing { line, source } => {
                let app = app.with_detail("line", line);
                match source {
                    PricingError::ProductNotFound(id) | PricingError::SecondFlavorNotFound(id) => {
                        app.with_detail("productId", id)
                    }
                    PricingError::SizeNotFound { size_id, .. } => app.with_detail("sizeId", size_id),
                    PricingError::ExtraNotFound { extra_id, .. }
                    | PricingError::ExtraQuantityOutOfRange { extra_id, .. } => {
                        app.with_detail("extraId", extra_id)
                    }
                    PricingError::HalfHalfSizeUnmatched { size_name, .. } => {
                        app.with_detail("sizeName", size_name)
                    }
                    _ => app,
                }
            }
            OrderError::PriceMismatch { line, expected, actual } => app
                .with_detail("line", line)
                .with_detail("expectedUnitPrice", expected)
                .with_detail("unitPrice", actual),
            OrderError::NotFound { id, .. } => app.with_detail("id", id),
            OrderError::State(e) => app
                .with_detail("action", e.action.as_str())
                .with_detail("status", e.status.as_str()),
            OrderError::StatusMismatch { expected, actual, .. } => app
                .with_detail("expected", expected.as_str())
                .with_detail("actual", actual.as_str()),
            OrderError::Concurrency(number) => app.with_detail("orderNumber", number),
            OrderError::Persistence(e) => {
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                app
            }
            OrderError::Validation { .. } => app,
        }
    }
}
