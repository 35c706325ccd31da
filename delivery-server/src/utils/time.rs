//! Business time helpers
//!
//! The calendar day that scopes order numbers is the day in the
//! restaurant's time zone, not UTC.

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Calendar date of a Unix millis timestamp in the business time zone
pub fn business_date(millis: i64, tz: Tz) -> NaiveDate {
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(&tz).date_naive(),
        None => chrono::Utc::now().with_timezone(&tz).date_naive(),
    }
}

/// Today in the business time zone
pub fn business_today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// Start of `date` (00:00:00) as Unix millis in the business time zone
///
/// DST gap fallback: when local midnight does not exist, use UTC midnight.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}
