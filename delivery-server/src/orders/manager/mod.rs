//! OrdersManager - order submission, lifecycle transitions, queries
//!
//! # Submission Flow
//!
//! ```text
//! submit_order(req)
//!     ├─ 1. Validate request shape (no I/O)
//!     ├─ 2. Price every line against the catalog
//!     ├─ 3. Compare with client-expected unit prices
//!     ├─ 4. Check cash change against the total
//!     ├─ 5. Begin write transaction
//!     ├─ 6. Resolve existing / insert new address
//!     ├─ 7. Allocate order number
//!     ├─ 8. Insert order + lines + extras + blends
//!     └─ 9. Commit + broadcast `created`
//! ```
//!
//! Transitions follow the same shape: load, check, write, then commit and
//! broadcast. The broadcaster's sequence lock is held across the commit, so
//! event sequences follow commit order. A broadcast never undoes a commit.
//!
//! All methods are synchronous and block on redb; async callers go through
//! `spawn_blocking`.

mod error;
pub use error::*;

use super::lifecycle::{self, Transition};
use super::numbering::OrderNumberAllocator;
use super::storage::OrderStorage;
use super::validation;
use crate::message::EventBroadcaster;
use crate::pricing::money::{round_money, same_amount, to_decimal, to_f64};
use crate::pricing::{PricedLine, PricingResolver, ProductLookup};
use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::models::Address;
use shared::order::{
    AddressInput, CartLineInput, Customer, OrderEvent, OrderEventType, OrderLineExtraSnapshot,
    OrderLineSnapshot, OrderSnapshot, OrderStatus, QuoteResponse, SubmitOrderRequest,
    TransitionRequest,
};
use shared::util::{now_millis, snowflake_id};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Result of a lifecycle action
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Status changed; the order as it is now
    Updated(OrderSnapshot),
    /// Order permanently removed; the order as it was
    Purged(OrderSnapshot),
}

impl TransitionOutcome {
    pub fn order(&self) -> &OrderSnapshot {
        match self {
            TransitionOutcome::Updated(order) | TransitionOutcome::Purged(order) => order,
        }
    }

    pub fn is_purged(&self) -> bool {
        matches!(self, TransitionOutcome::Purged(_))
    }
}

/// Catalog handle used for pricing
pub type SharedCatalog = Arc<dyn ProductLookup + Send + Sync>;

#[derive(Clone)]
pub struct OrdersManager {
    storage: OrderStorage,
    catalog: SharedCatalog,
    allocator: OrderNumberAllocator,
    bus: EventBroadcaster,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("timezone", &self.allocator.timezone())
            .field("subscribers", &self.bus.subscriber_count())
            .finish()
    }
}

impl OrdersManager {
    pub fn new(
        storage: OrderStorage,
        catalog: SharedCatalog,
        allocator: OrderNumberAllocator,
        bus: EventBroadcaster,
    ) -> Self {
        Self {
            storage,
            catalog,
            allocator,
            bus,
        }
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    pub fn bus(&self) -> &EventBroadcaster {
        &self.bus
    }

    /// Zone whose calendar day scopes order numbers
    pub fn timezone(&self) -> Tz {
        self.allocator.timezone()
    }

    /// Subscribe to live order events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.bus.subscribe()
    }

    // ========== Pricing ==========

    fn price_lines(&self, items: &[CartLineInput]) -> ManagerResult<Vec<PricedLine>> {
        let resolver = PricingResolver::new(self.catalog.as_ref());
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let priced = resolver
                    .resolve(item)
                    .map_err(|e| OrderError::pricing(index, e))?;
                if let Some(expected) = item.expected_unit_price
                    && !same_amount(expected, priced.unit_price)
                {
                    return Err(OrderError::PriceMismatch {
                        line: index + 1,
                        expected,
                        actual: to_f64(priced.unit_price),
                    });
                }
                Ok(priced)
            })
            .collect()
    }

    /// Price cart lines without persisting anything
    pub fn quote(&self, items: &[CartLineInput]) -> ManagerResult<QuoteResponse> {
        if items.is_empty() {
            return Err(OrderError::validation(
                ErrorCode::OrderEmpty,
                "Quote must contain at least one item",
            ));
        }
        let priced = self.price_lines(items)?;
        let items_total: Decimal = priced.iter().map(|line| line.line_total).sum();
        Ok(QuoteResponse {
            lines: priced.iter().map(PricedLine::to_quoted).collect(),
            items_total: to_f64(items_total),
        })
    }

    // ========== Submission ==========

    /// Validate, price, number and persist a new order, then broadcast it
    pub fn submit_order(&self, req: SubmitOrderRequest) -> ManagerResult<OrderSnapshot> {
        self.submit_order_at(req, now_millis())
    }

    /// [`Self::submit_order`] with an explicit clock
    pub fn submit_order_at(&self, req: SubmitOrderRequest, now: i64) -> ManagerResult<OrderSnapshot> {
        validation::validate_submission(&req)?;
        let customer = validation::resolve_customer(&req.customer)?;

        let priced = self.price_lines(&req.items)?;
        let items_total = round_money(priced.iter().map(|line| line.line_total).sum());
        let delivery_fee = to_decimal(req.delivery_fee).map(round_money).ok_or_else(|| {
            OrderError::validation(ErrorCode::ValueOutOfRange, "deliveryFee is not a valid amount")
        })?;
        let total = items_total + delivery_fee;

        let (cash_change_requested, cash_change_for) = validation::check_cash_change(
            req.payment_method,
            req.cash_change_requested,
            req.cash_change_for,
            total,
        )?;

        let txn = self.storage.begin_write()?;

        let address = match req.delivery_address {
            Some(AddressInput::Existing(address_id)) => {
                let address = self
                    .storage
                    .get_address_txn(&txn, address_id)?
                    .ok_or(OrderError::not_found(Resource::Address, address_id))?;
                // Someone else's saved address is reported as missing
                if let Some(owner) = address.user_id
                    && customer != (Customer::User { user_id: owner })
                {
                    return Err(OrderError::not_found(Resource::Address, address_id));
                }
                address
            }
            Some(AddressInput::New(create)) => {
                let owner = match customer {
                    Customer::User { user_id } => Some(user_id),
                    Customer::Guest { .. } => None,
                };
                let address = create.into_address(snowflake_id(), owner, now);
                self.storage.insert_address(&txn, &address)?;
                address
            }
            None => {
                return Err(OrderError::validation(
                    ErrorCode::AddressRequired,
                    "A delivery address is required",
                ));
            }
        };

        let order_number = self.allocator.allocate(&txn, now)?;

        let lines = priced
            .into_iter()
            .zip(req.items)
            .map(|(line, item)| build_line(line, item.note))
            .collect();

        let snapshot = OrderSnapshot {
            id: snowflake_id(),
            order_number: order_number.to_string(),
            status: OrderStatus::Pending,
            customer,
            address,
            payment_method: req.payment_method,
            cash_change_requested,
            cash_change_for,
            lines,
            items_total: to_f64(items_total),
            delivery_fee: to_f64(delivery_fee),
            total: to_f64(total),
            created_at: now,
            updated_at: now,
        };

        self.storage.insert_order(&txn, &snapshot)?;
        self.bus.commit_and_publish(
            || txn.commit(),
            OrderEventType::Created,
            None,
            snapshot.clone(),
        )?;

        tracing::info!(
            order_id = snapshot.id,
            order_number = %snapshot.order_number,
            total = snapshot.total,
            lines = snapshot.lines.len(),
            "Order created"
        );
        Ok(snapshot)
    }

    // ========== Lifecycle ==========

    /// Apply an administrative lifecycle action, then broadcast the result
    pub fn transition(&self, order_id: i64, req: TransitionRequest) -> ManagerResult<TransitionOutcome> {
        self.transition_at(order_id, req, now_millis())
    }

    /// [`Self::transition`] with an explicit clock
    pub fn transition_at(
        &self,
        order_id: i64,
        req: TransitionRequest,
        now: i64,
    ) -> ManagerResult<TransitionOutcome> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .load_order_txn(&txn, order_id)?
            .ok_or(OrderError::not_found(Resource::Order, order_id))?;
        let previous = order.status;

        if let Some(expected) = req.expected_status
            && expected != previous
        {
            return Err(OrderError::StatusMismatch {
                order_id,
                expected,
                actual: previous,
            });
        }

        match lifecycle::apply(previous, req.action)? {
            Transition::To(status) => {
                self.storage.update_status(&txn, order_id, status, now)?;
                order.status = status;
                order.updated_at = now;
                self.bus.commit_and_publish(
                    || txn.commit(),
                    OrderEventType::StatusChanged,
                    Some(previous),
                    order.clone(),
                )?;

                tracing::info!(
                    order_id,
                    order_number = %order.order_number,
                    action = %req.action,
                    from = %previous,
                    to = %status,
                    "Order status changed"
                );
                Ok(TransitionOutcome::Updated(order))
            }
            Transition::Purge => {
                self.storage.delete_order(&txn, order_id)?;
                self.bus.commit_and_publish(
                    || txn.commit(),
                    OrderEventType::Purged,
                    Some(previous),
                    order.clone(),
                )?;

                tracing::info!(
                    order_id,
                    order_number = %order.order_number,
                    "Order purged"
                );
                Ok(TransitionOutcome::Purged(order))
            }
        }
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: i64) -> ManagerResult<OrderSnapshot> {
        self.storage
            .load_order(order_id)?
            .ok_or(OrderError::not_found(Resource::Order, order_id))
    }

    /// Orders newest first, optionally for one business day and/or status
    pub fn list_orders(
        &self,
        date: Option<NaiveDate>,
        status: Option<OrderStatus>,
    ) -> ManagerResult<Vec<OrderSnapshot>> {
        Ok(self.storage.list_orders(date, status)?)
    }

    /// Address lookup for the order form
    pub fn get_address(&self, address_id: i64) -> ManagerResult<Address> {
        self.storage
            .get_address(address_id)?
            .ok_or(OrderError::not_found(Resource::Address, address_id))
    }
}

/// Freeze a priced line into its stored form
fn build_line(line: PricedLine, note: Option<String>) -> OrderLineSnapshot {
    OrderLineSnapshot {
        id: snowflake_id(),
        product_id: line.product_id,
        product_name: line.product_name,
        size_id: line.size_id,
        size_name: line.size_name,
        second_flavor: line.second_flavor,
        quantity: line.quantity,
        unit_price_at_time: to_f64(line.unit_price),
        line_total: to_f64(line.line_total),
        note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        extras: line
            .extras
            .into_iter()
            .map(|extra| OrderLineExtraSnapshot {
                extra_id: extra.extra_id,
                name: extra.name,
                quantity: extra.quantity,
                unit_price_at_time: to_f64(extra.unit_price),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests;
