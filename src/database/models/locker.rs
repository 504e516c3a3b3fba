use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::services::status;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "lowercase")]
    pub enum LockerStatus {
        Available => "available",
        Occupied => "occupied",
        Expired => "expired",
        Maintenance => "maintenance",
    }
}

/// Stored locker row. `version` increments on every write and guards the
/// compare-and-swap updates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Locker {
    pub locker_number: i32,
    pub status: LockerStatus,
    pub member_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl Locker {
    /// Stand-in for a number that has never been written.
    pub fn placeholder(locker_number: i32, now: DateTime<Utc>) -> Self {
        Locker {
            locker_number,
            status: LockerStatus::Available,
            member_id: None,
            start_date: None,
            end_date: None,
            version: 0,
            updated_at: now,
        }
    }

    /// Status as callers see it: an occupied locker past its end date reads
    /// as expired without any write.
    pub fn effective_status(&self, now: DateTime<Utc>) -> LockerStatus {
        match self.status {
            LockerStatus::Occupied if status::is_elapsed(self.end_date, now) => {
                LockerStatus::Expired
            }
            status => status,
        }
    }

    pub fn view(self, now: DateTime<Utc>) -> LockerView {
        let status = self.effective_status(now);
        LockerView {
            locker_number: self.locker_number,
            status,
            member_id: self.member_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LockerView {
    pub locker_number: i32,
    pub status: LockerStatus,
    pub member_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LockerSummary {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub expired: usize,
    pub maintenance: usize,
}

impl LockerSummary {
    pub fn from_views(views: &[LockerView]) -> Self {
        let mut summary = LockerSummary {
            total: views.len(),
            ..Default::default()
        };
        for view in views {
            match view.status {
                LockerStatus::Available => summary.available += 1,
                LockerStatus::Occupied => summary.occupied += 1,
                LockerStatus::Expired => summary.expired += 1,
                LockerStatus::Maintenance => summary.maintenance += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLockerInput {
    pub member_id: Uuid,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceInput {
    pub enabled: bool,
}
