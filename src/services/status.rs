//! Read-time status of date-bounded entitlements.
//!
//! Stored dates are civil dates taken at UTC midnight. Nothing here reads the
//! clock: callers pass `now`, so results are deterministic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPIRING_THRESHOLD_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementStatus {
    Active,
    Expiring,
    Expired,
}

/// Start of the civil day as an instant.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Whole days left until `end_date`, rounded up and clamped at zero. A missing
/// end date counts as already elapsed.
pub fn days_remaining(end_date: Option<NaiveDate>, now: DateTime<Utc>) -> i64 {
    let Some(end_date) = end_date else {
        return 0;
    };
    let millis = (day_start(end_date) - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

pub fn classify(days_remaining: i64) -> EntitlementStatus {
    classify_with(days_remaining, DEFAULT_EXPIRING_THRESHOLD_DAYS)
}

pub fn classify_with(days_remaining: i64, expiring_threshold_days: i64) -> EntitlementStatus {
    if days_remaining <= 0 {
        EntitlementStatus::Expired
    } else if days_remaining <= expiring_threshold_days {
        EntitlementStatus::Expiring
    } else {
        EntitlementStatus::Active
    }
}

pub fn is_elapsed(end_date: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    days_remaining(end_date, now) == 0
}
