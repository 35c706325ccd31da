//! Live order events
//!
//! [`EventBroadcaster`] fans every committed order change out to all
//! subscribers (staff dashboards, tracking pages) over one shared topic.

pub mod bus;

pub use bus::{EventBroadcaster, PublishOutcome};
