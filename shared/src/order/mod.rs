//! Order contracts
//!
//! - Commands: submission, transition and quote payloads sent by clients
//! - Snapshots: the fully-resolved order returned and broadcast by the server
//! - Events: envelopes pushed to live subscribers

pub mod command;
pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{
    AddressInput, CartLineInput, CustomerInput, ExtraSelection, QuoteRequest, QuoteResponse,
    QuotedLine, SubmitOrderRequest, TransitionRequest,
};
pub use event::{LiveControl, OrderEvent, OrderEventType};
pub use snapshot::{
    BlendSnapshot, Customer, OrderLineExtraSnapshot, OrderLineSnapshot, OrderSnapshot,
};
pub use types::{LifecycleAction, OrderStatus, PaymentMethod};
