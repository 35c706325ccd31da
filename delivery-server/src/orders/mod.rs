//! Order composition and lifecycle
//!
//! - **manager**: OrdersManager, the entry point for submissions and transitions
//! - **numbering**: OrderNumberAllocator, daily sequential order numbers
//! - **lifecycle**: status state machine
//! - **storage**: redb persistence of orders and their frozen lines
//! - **validation**: submission checks that run before any write
//!
//! # Data Flow
//!
//! ```text
//! SubmitOrderRequest
//!     ├─ 1. Validate identity, address, items, fee
//!     ├─ 2. Price every line (PricingResolver)
//!     ├─ 3. Check cash change against the total
//!     ├─ 4. Begin write transaction
//!     ├─ 5. Resolve or insert the address
//!     ├─ 6. Allocate the order number (same transaction)
//!     ├─ 7. Insert order, lines, extras, blends
//!     ├─ 8. Commit
//!     └─ 9. Broadcast `created` with the full snapshot
//! ```

pub mod lifecycle;
pub mod manager;
pub mod numbering;
pub mod storage;
pub mod validation;

pub use lifecycle::{LifecycleError, Transition};
pub use manager::{OrderError, OrdersManager, TransitionOutcome};
pub use numbering::{OrderNumber, OrderNumberAllocator};
pub use storage::OrderStorage;
