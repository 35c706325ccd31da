//! OrderNumberAllocator - daily sequential order numbers
//!
//! Format: `{YYYY-MM-DD}-{sequence:03}`, e.g. `2026-03-14-007`. Sequences
//! wider than three digits keep growing (`2026-03-14-1000`).
//!
//! The next sequence comes from the `daily_counters` row for the business
//! date, read and incremented inside the caller's write transaction. redb
//! runs one write transaction at a time, so two concurrent submissions can
//! never observe the same counter value. A missing counter row is seeded
//! from the order numbers already indexed for that date.

use crate::db::{DAILY_COUNTERS_TABLE, ORDER_NUMBERS_TABLE, StorageResult};
use crate::utils::time::business_date;
use chrono::NaiveDate;
use chrono_tz::Tz;
use redb::{ReadableTable, WriteTransaction};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Human-facing order number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderNumber {
    pub date: NaiveDate,
    pub sequence: u64,
}

impl OrderNumber {
    pub fn new(date: NaiveDate, sequence: u64) -> Self {
        Self { date, sequence }
    }

    /// Prefix shared by every order number issued on `date`
    pub fn day_prefix(date: NaiveDate) -> String {
        format!("{}-", date.format(DATE_FORMAT))
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.date.format(DATE_FORMAT), self.sequence)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid order number: {0}")]
pub struct InvalidOrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = InvalidOrderNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidOrderNumber(s.to_string());
        let (date, sequence) = s.rsplit_once('-').ok_or_else(invalid)?;
        if sequence.len() < 3 {
            return Err(invalid());
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;
        let sequence = sequence.parse::<u64>().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }
        Ok(Self { date, sequence })
    }
}

/// Allocates order numbers for the business time zone's calendar day
#[derive(Debug, Clone, Copy)]
pub struct OrderNumberAllocator {
    tz: Tz,
}

impl OrderNumberAllocator {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Business date of a Unix millis timestamp
    pub fn date_of(&self, millis: i64) -> NaiveDate {
        business_date(millis, self.tz)
    }

    /// Issue the next number for the day containing `now_millis`
    ///
    /// Nothing is visible to other transactions until the caller commits;
    /// an aborted transaction gives the sequence back.
    pub fn allocate(&self, txn: &WriteTransaction, now_millis: i64) -> StorageResult<OrderNumber> {
        let date = self.date_of(now_millis);
        let key = date.format(DATE_FORMAT).to_string();

        let mut counters = txn.open_table(DAILY_COUNTERS_TABLE)?;
        let current = match counters.get(key.as_str())? {
            Some(guard) => guard.value(),
            None => {
                let seeded = issued_on(txn, date)?;
                if seeded > 0 {
                    tracing::info!(date = %key, seeded, "Seeding daily order counter from existing orders");
                }
                seeded
            }
        };

        let sequence = current + 1;
        counters.insert(key.as_str(), sequence)?;
        Ok(OrderNumber::new(date, sequence))
    }

    /// Last sequence issued on `date` (0 if none)
    pub fn last_issued(&self, txn: &WriteTransaction, date: NaiveDate) -> StorageResult<u64> {
        let key = date.format(DATE_FORMAT).to_string();
        let counters = txn.open_table(DAILY_COUNTERS_TABLE)?;
        match counters.get(key.as_str())? {
            Some(guard) => Ok(guard.value()),
            None => issued_on(txn, date),
        }
    }
}

/// Orders already numbered on `date`: the larger of their count and the
/// highest sequence among them, so a gap left by a purge is never reused.
fn issued_on(txn: &WriteTransaction, date: NaiveDate) -> StorageResult<u64> {
    let prefix = OrderNumber::day_prefix(date);
    // '.' sorts right after '-'
    let end = format!("{}.", date.format(DATE_FORMAT));

    let numbers = txn.open_table(ORDER_NUMBERS_TABLE)?;
    let mut count = 0u64;
    let mut highest = 0u64;
    for entry in numbers.range(prefix.as_str()..end.as_str())? {
        let (key, _) = entry?;
        count += 1;
        if let Ok(number) = key.value().parse::<OrderNumber>() {
            highest = highest.max(number.sequence);
        }
    }
    Ok(count.max(highest))
}
