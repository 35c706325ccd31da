//! redb-backed order repository
//!
//! An order is stored normalized across five tables (header, lines, line
//! extras, half-half blends, number index) and reassembled into an
//! [`OrderSnapshot`] on read. Every write goes through a caller-owned
//! [`WriteTransaction`], so an order and all of its rows become visible in
//! one commit or not at all.

use crate::db::{
    ADDRESSES_TABLE, ORDER_LINE_BLENDS_TABLE, ORDER_LINE_EXTRAS_TABLE, ORDER_LINES_TABLE,
    ORDER_NUMBERS_TABLE, ORDERS_TABLE, StorageError, StorageResult,
};
use chrono::NaiveDate;
use redb::{Database, ReadableDatabase, ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use shared::models::Address;
use shared::order::{
    BlendSnapshot, Customer, OrderLineExtraSnapshot, OrderLineSnapshot, OrderSnapshot,
    OrderStatus, PaymentMethod,
};
use std::sync::Arc;

use super::numbering::OrderNumber;

type Blob = &'static [u8];

/// `orders` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub customer: Customer,
    pub address_id: i64,
    pub payment_method: PaymentMethod,
    pub cash_change_requested: bool,
    pub cash_change_for: Option<f64>,
    pub items_total: f64,
    pub delivery_fee: f64,
    pub total: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// `order_lines` row, prices frozen at submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRecord {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub size_id: Option<i64>,
    pub size_name: Option<String>,
    pub quantity: i32,
    pub unit_price_at_time: f64,
    pub line_total: f64,
    pub note: Option<String>,
}

/// `order_line_extras` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineExtraRecord {
    pub order_line_id: i64,
    pub extra_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price_at_time: f64,
}

/// `order_line_blends` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineBlendRecord {
    pub order_line_id: i64,
    pub first_flavor_product_id: i64,
    pub second_flavor_product_id: i64,
    pub second_flavor_name: String,
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Addresses ==========

    pub fn insert_address(&self, txn: &WriteTransaction, address: &Address) -> StorageResult<()> {
        let mut table = txn.open_table(ADDRESSES_TABLE)?;
        let value = serde_json::to_vec(address)?;
        table.insert(address.id, value.as_slice())?;
        Ok(())
    }

    /// Get an address (within transaction)
    pub fn get_address_txn(
        &self,
        txn: &WriteTransaction,
        address_id: i64,
    ) -> StorageResult<Option<Address>> {
        let table = txn.open_table(ADDRESSES_TABLE)?;
        read_json(&table, address_id)
    }

    pub fn get_address(&self, address_id: i64) -> StorageResult<Option<Address>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ADDRESSES_TABLE)?;
        read_json(&table, address_id)
    }

    // ========== Orders ==========

    /// Write a complete order: header, lines, extras, blends, number index
    ///
    /// The delivery address must already be stored. Fails with
    /// [`StorageError::DuplicateOrderNumber`] if the number is taken; the
    /// caller must then drop the transaction.
    pub fn insert_order(&self, txn: &WriteTransaction, snapshot: &OrderSnapshot) -> StorageResult<()> {
        {
            let mut numbers = txn.open_table(ORDER_NUMBERS_TABLE)?;
            if numbers.get(snapshot.order_number.as_str())?.is_some() {
                return Err(StorageError::DuplicateOrderNumber(snapshot.order_number.clone()));
            }
            numbers.insert(snapshot.order_number.as_str(), snapshot.id)?;
        }

        let record = OrderRecord {
            id: snapshot.id,
            order_number: snapshot.order_number.clone(),
            status: snapshot.status,
            customer: snapshot.customer.clone(),
            address_id: snapshot.address.id,
            payment_method: snapshot.payment_method,
            cash_change_requested: snapshot.cash_change_requested,
            cash_change_for: snapshot.cash_change_for,
            items_total: snapshot.items_total,
            delivery_fee: snapshot.delivery_fee,
            total: snapshot.total,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        };
        let mut orders = txn.open_table(ORDERS_TABLE)?;
        orders.insert(snapshot.id, serde_json::to_vec(&record)?.as_slice())?;

        let mut lines = txn.open_table(ORDER_LINES_TABLE)?;
        let mut extras = txn.open_table(ORDER_LINE_EXTRAS_TABLE)?;
        let mut blends = txn.open_table(ORDER_LINE_BLENDS_TABLE)?;

        for (position, line) in (0u32..).zip(&snapshot.lines) {
            let line_record = OrderLineRecord {
                id: line.id,
                order_id: snapshot.id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                size_id: line.size_id,
                size_name: line.size_name.clone(),
                quantity: line.quantity,
                unit_price_at_time: line.unit_price_at_time,
                line_total: line.line_total,
                note: line.note.clone(),
            };
            lines.insert((snapshot.id, position), serde_json::to_vec(&line_record)?.as_slice())?;

            for (extra_position, extra) in (0u32..).zip(&line.extras) {
                let extra_record = OrderLineExtraRecord {
                    order_line_id: line.id,
                    extra_id: extra.extra_id,
                    name: extra.name.clone(),
                    quantity: extra.quantity,
                    unit_price_at_time: extra.unit_price_at_time,
                };
                extras.insert(
                    (line.id, extra_position),
                    serde_json::to_vec(&extra_record)?.as_slice(),
                )?;
            }

            if let Some(second) = &line.second_flavor {
                let blend = OrderLineBlendRecord {
                    order_line_id: line.id,
                    first_flavor_product_id: line.product_id,
                    second_flavor_product_id: second.product_id,
                    second_flavor_name: second.product_name.clone(),
                };
                blends.insert(line.id, serde_json::to_vec(&blend)?.as_slice())?;
            }
        }

        Ok(())
    }

    /// Load a complete order (within transaction)
    pub fn load_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: i64,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let orders = txn.open_table(ORDERS_TABLE)?;
        let lines = txn.open_table(ORDER_LINES_TABLE)?;
        let extras = txn.open_table(ORDER_LINE_EXTRAS_TABLE)?;
        let blends = txn.open_table(ORDER_LINE_BLENDS_TABLE)?;
        let addresses = txn.open_table(ADDRESSES_TABLE)?;
        assemble(&orders, &lines, &extras, &blends, &addresses, order_id)
    }

    /// Load a complete order
    pub fn load_order(&self, order_id: i64) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let lines = read_txn.open_table(ORDER_LINES_TABLE)?;
        let extras = read_txn.open_table(ORDER_LINE_EXTRAS_TABLE)?;
        let blends = read_txn.open_table(ORDER_LINE_BLENDS_TABLE)?;
        let addresses = read_txn.open_table(ADDRESSES_TABLE)?;
        assemble(&orders, &lines, &extras, &blends, &addresses, order_id)
    }

    /// Order id behind a human-facing number
    pub fn find_by_number(&self, order_number: &str) -> StorageResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let numbers = read_txn.open_table(ORDER_NUMBERS_TABLE)?;
        Ok(numbers.get(order_number)?.map(|guard| guard.value()))
    }

    /// Orders matching the filters, newest first
    ///
    /// `date` selects by order number, i.e. by the business day the order
    /// was numbered on.
    pub fn list_orders(
        &self,
        date: Option<NaiveDate>,
        status: Option<OrderStatus>,
    ) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let lines = read_txn.open_table(ORDER_LINES_TABLE)?;
        let extras = read_txn.open_table(ORDER_LINE_EXTRAS_TABLE)?;
        let blends = read_txn.open_table(ORDER_LINE_BLENDS_TABLE)?;
        let addresses = read_txn.open_table(ADDRESSES_TABLE)?;

        let ids: Vec<i64> = match date {
            Some(date) => {
                let numbers = read_txn.open_table(ORDER_NUMBERS_TABLE)?;
                let start = OrderNumber::day_prefix(date);
                let end = format!("{}.", date.format("%Y-%m-%d"));
                let mut ids = Vec::new();
                for entry in numbers.range(start.as_str()..end.as_str())? {
                    let (_, id) = entry?;
                    ids.push(id.value());
                }
                ids
            }
            None => {
                let mut ids = Vec::new();
                for entry in orders.iter()? {
                    let (key, _) = entry?;
                    ids.push(key.value());
                }
                ids
            }
        };

        let mut snapshots = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(snapshot) = assemble(&orders, &lines, &extras, &blends, &addresses, id)?
                && status.is_none_or(|s| s == snapshot.status)
            {
                snapshots.push(snapshot);
            }
        }

        snapshots.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        Ok(snapshots)
    }

    /// Persist a new status on the order header
    ///
    /// Returns `false` if the order does not exist.
    pub fn update_status(
        &self,
        txn: &WriteTransaction,
        order_id: i64,
        status: OrderStatus,
        updated_at: i64,
    ) -> StorageResult<bool> {
        let mut orders = txn.open_table(ORDERS_TABLE)?;
        let Some(mut record) = read_json::<_, OrderRecord>(&orders, order_id)? else {
            return Ok(false);
        };
        record.status = status;
        record.updated_at = updated_at;
        orders.insert(order_id, serde_json::to_vec(&record)?.as_slice())?;
        Ok(true)
    }

    /// Permanently remove an order and every row it owns
    ///
    /// The address and the daily counter are left untouched, so the order
    /// number is never handed out again. Returns `false` if the order does
    /// not exist.
    pub fn delete_order(&self, txn: &WriteTransaction, order_id: i64) -> StorageResult<bool> {
        let mut orders = txn.open_table(ORDERS_TABLE)?;
        let Some(record) = read_json::<_, OrderRecord>(&orders, order_id)? else {
            return Ok(false);
        };
        orders.remove(order_id)?;

        let mut lines = txn.open_table(ORDER_LINES_TABLE)?;
        let mut extras = txn.open_table(ORDER_LINE_EXTRAS_TABLE)?;
        let mut blends = txn.open_table(ORDER_LINE_BLENDS_TABLE)?;

        let mut line_keys = Vec::new();
        for entry in lines.range((order_id, 0u32)..=(order_id, u32::MAX))? {
            let (key, value) = entry?;
            let line: OrderLineRecord = serde_json::from_slice(value.value())?;
            line_keys.push((key.value(), line.id));
        }

        for (line_key, line_id) in line_keys {
            let mut extra_keys = Vec::new();
            for entry in extras.range((line_id, 0u32)..=(line_id, u32::MAX))? {
                let (key, _) = entry?;
                extra_keys.push(key.value());
            }
            for key in extra_keys {
                extras.remove(key)?;
            }
            blends.remove(line_id)?;
            lines.remove(line_key)?;
        }

        let mut numbers = txn.open_table(ORDER_NUMBERS_TABLE)?;
        numbers.remove(record.order_number.as_str())?;
        Ok(true)
    }
}

fn read_json<T, R>(table: &T, key: i64) -> StorageResult<Option<R>>
where
    T: ReadableTable<i64, Blob>,
    R: for<'de> Deserialize<'de>,
{
    match table.get(key)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Rebuild the full snapshot from its normalized rows
fn assemble<O, L, E, B, A>(
    orders: &O,
    lines: &L,
    extras: &E,
    blends: &B,
    addresses: &A,
    order_id: i64,
) -> StorageResult<Option<OrderSnapshot>>
where
    O: ReadableTable<i64, Blob>,
    L: ReadableTable<(i64, u32), Blob>,
    E: ReadableTable<(i64, u32), Blob>,
    B: ReadableTable<i64, Blob>,
    A: ReadableTable<i64, Blob>,
{
    let Some(record) = read_json::<_, OrderRecord>(orders, order_id)? else {
        return Ok(None);
    };

    let address = read_json::<_, Address>(addresses, record.address_id)?.ok_or_else(|| {
        tracing::error!(
            order_id,
            address_id = record.address_id,
            "Order references a missing address"
        );
        StorageError::MissingRow(format!("address {}", record.address_id))
    })?;

    let mut line_snapshots = Vec::new();
    for entry in lines.range((order_id, 0u32)..=(order_id, u32::MAX))? {
        let (_, value) = entry?;
        let line: OrderLineRecord = serde_json::from_slice(value.value())?;

        let mut line_extras = Vec::new();
        for entry in extras.range((line.id, 0u32)..=(line.id, u32::MAX))? {
            let (_, value) = entry?;
            let extra: OrderLineExtraRecord = serde_json::from_slice(value.value())?;
            line_extras.push(OrderLineExtraSnapshot {
                extra_id: extra.extra_id,
                name: extra.name,
                quantity: extra.quantity,
                unit_price_at_time: extra.unit_price_at_time,
            });
        }

        let second_flavor = read_json::<_, OrderLineBlendRecord>(blends, line.id)?.map(|blend| {
            BlendSnapshot {
                product_id: blend.second_flavor_product_id,
                product_name: blend.second_flavor_name,
            }
        });

        line_snapshots.push(OrderLineSnapshot {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            size_id: line.size_id,
            size_name: line.size_name,
            second_flavor,
            quantity: line.quantity,
            unit_price_at_time: line.unit_price_at_time,
            line_total: line.line_total,
            note: line.note,
            extras: line_extras,
        });
    }

    Ok(Some(OrderSnapshot {
        id: record.id,
        order_number: record.order_number,
        status: record.status,
        customer: record.customer,
        address,
        payment_method: record.payment_method,
        cash_change_requested: record.cash_change_requested,
        cash_change_for: record.cash_change_for,
        lines: line_snapshots,
        items_total: record.items_total,
        delivery_fee: record.delivery_fee,
        total: record.total,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use redb::ReadableTableMetadata;

    fn address(id: i64) -> Address {
        Address {
            id,
            user_id: None,
            street: "Rua Augusta".into(),
            number: "1200".into(),
            complement: Some("apto 41".into()),
            neighborhood: "Consolação".into(),
            city: "São Paulo".into(),
            reference: None,
            zip_code: Some("01304-001".into()),
            created_at: 1_000,
        }
    }

    fn snapshot(id: i64, order_number: &str, created_at: i64) -> OrderSnapshot {
        OrderSnapshot {
            id,
            order_number: order_number.to_string(),
            status: OrderStatus::Pending,
            customer: Customer::Guest {
                guest_name: "Ana".into(),
                guest_phone: "11999990000".into(),
            },
            address: address(900),
            payment_method: PaymentMethod::Cash,
            cash_change_requested: true,
            cash_change_for: Some(100.0),
            lines: vec![
                OrderLineSnapshot {
                    id: id * 10 + 1,
                    product_id: 1,
                    product_name: "Margherita".into(),
                    size_id: Some(11),
                    size_name: Some("M".into()),
                    second_flavor: Some(BlendSnapshot {
                        product_id: 2,
                        product_name: "Calabresa".into(),
                    }),
                    quantity: 1,
                    unit_price_at_time: 45.0,
                    line_total: 53.0,
                    note: Some("bem assada".into()),
                    extras: vec![OrderLineExtraSnapshot {
                        extra_id: 101,
                        name: "Borda recheada".into(),
                        quantity: 1,
                        unit_price_at_time: 8.0,
                    }],
                },
                OrderLineSnapshot {
                    id: id * 10 + 2,
                    product_id: 3,
                    product_name: "X-Burger".into(),
                    size_id: None,
                    size_name: None,
                    second_flavor: None,
                    quantity: 2,
                    unit_price_at_time: 18.0,
                    line_total: 48.0,
                    note: None,
                    extras: vec![],
                },
            ],
            items_total: 101.0,
            delivery_fee: 7.0,
            total: 108.0,
            created_at,
            updated_at: created_at,
        }
    }

    fn storage_with(orders: &[OrderSnapshot]) -> OrderStorage {
        let storage = OrderStorage::new(db::open_in_memory().unwrap());
        let txn = storage.begin_write().unwrap();
        storage.insert_address(&txn, &address(900)).unwrap();
        for order in orders {
            storage.insert_order(&txn, order).unwrap();
        }
        txn.commit().unwrap();
        storage
    }

    #[test]
    fn test_insert_and_load_round_trip() {
        let order = snapshot(1, "2026-03-14-001", 10);
        let storage = storage_with(std::slice::from_ref(&order));

        let loaded = storage.load_order(1).unwrap().unwrap();
        assert_eq!(loaded, order);
        assert_eq!(storage.find_by_number("2026-03-14-001").unwrap(), Some(1));
        assert!(storage.load_order(2).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_order_number_is_refused() {
        let storage = storage_with(&[snapshot(1, "2026-03-14-001", 10)]);

        let txn = storage.begin_write().unwrap();
        let err = storage
            .insert_order(&txn, &snapshot(2, "2026-03-14-001", 20))
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateOrderNumber(n) if n == "2026-03-14-001"));
        drop(txn);

        assert!(storage.load_order(2).unwrap().is_none());
    }

    #[test]
    fn test_uncommitted_order_is_invisible() {
        let storage = storage_with(&[]);
        let txn = storage.begin_write().unwrap();
        storage.insert_order(&txn, &snapshot(1, "2026-03-14-001", 10)).unwrap();
        assert!(storage.load_order_txn(&txn, 1).unwrap().is_some());
        assert!(storage.load_order(1).unwrap().is_none());
        txn.abort().unwrap();
        assert!(storage.load_order(1).unwrap().is_none());
    }

    #[test]
    fn test_update_status() {
        let storage = storage_with(&[snapshot(1, "2026-03-14-001", 10)]);

        let txn = storage.begin_write().unwrap();
        assert!(storage.update_status(&txn, 1, OrderStatus::InPreparation, 99).unwrap());
        assert!(!storage.update_status(&txn, 2, OrderStatus::InPreparation, 99).unwrap());
        txn.commit().unwrap();

        let loaded = storage.load_order(1).unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::InPreparation);
        assert_eq!(loaded.updated_at, 99);
        assert_eq!(loaded.lines[0].unit_price_at_time, 45.0);
    }

    #[test]
    fn test_delete_order_removes_every_row() {
        let storage = storage_with(&[
            snapshot(1, "2026-03-14-001", 10),
            snapshot(2, "2026-03-14-002", 20),
        ]);

        let txn = storage.begin_write().unwrap();
        assert!(storage.delete_order(&txn, 1).unwrap());
        assert!(!storage.delete_order(&txn, 1).unwrap());
        txn.commit().unwrap();

        assert!(storage.load_order(1).unwrap().is_none());
        assert!(storage.find_by_number("2026-03-14-001").unwrap().is_none());
        assert_eq!(storage.load_order(2).unwrap().unwrap().lines.len(), 2);

        let read_txn = storage.db.begin_read().unwrap();
        assert_eq!(read_txn.open_table(ORDER_LINES_TABLE).unwrap().len().unwrap(), 2);
        assert_eq!(read_txn.open_table(ORDER_LINE_EXTRAS_TABLE).unwrap().len().unwrap(), 1);
        assert_eq!(read_txn.open_table(ORDER_LINE_BLENDS_TABLE).unwrap().len().unwrap(), 1);
        assert_eq!(read_txn.open_table(ADDRESSES_TABLE).unwrap().len().unwrap(), 1);
    }

    #[test]
    fn test_list_orders_filters_and_sorts() {
        let mut delivered = snapshot(3, "2026-03-15-001", 30);
        delivered.status = OrderStatus::Delivered;
        let storage = storage_with(&[
            snapshot(1, "2026-03-14-001", 10),
            snapshot(2, "2026-03-14-002", 20),
            delivered,
        ]);

        let all: Vec<i64> = storage.list_orders(None, None).unwrap().iter().map(|o| o.id).collect();
        assert_eq!(all, vec![3, 2, 1]);

        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let on_day: Vec<i64> = storage
            .list_orders(Some(day), None)
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(on_day, vec![2, 1]);

        let delivered = storage.list_orders(None, Some(OrderStatus::Delivered)).unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].order_number, "2026-03-15-001");
    }

    #[test]
    fn test_address_lookup() {
        let storage = storage_with(&[]);
        assert_eq!(storage.get_address(900).unwrap(), Some(address(900)));
        assert!(storage.get_address(901).unwrap().is_none());
    }
}
