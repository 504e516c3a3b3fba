use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum ScheduleStatus {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// Bookable hourly PT slots.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum TimeSlot {
        #[serde(rename = "09:00")]
        H09 => "09:00",
        #[serde(rename = "10:00")]
        H10 => "10:00",
        #[serde(rename = "11:00")]
        H11 => "11:00",
        #[serde(rename = "12:00")]
        H12 => "12:00",
        #[serde(rename = "13:00")]
        H13 => "13:00",
        #[serde(rename = "14:00")]
        H14 => "14:00",
        #[serde(rename = "15:00")]
        H15 => "15:00",
        #[serde(rename = "16:00")]
        H16 => "16:00",
        #[serde(rename = "17:00")]
        H17 => "17:00",
        #[serde(rename = "18:00")]
        H18 => "18:00",
        #[serde(rename = "19:00")]
        H19 => "19:00",
        #[serde(rename = "20:00")]
        H20 => "20:00",
        #[serde(rename = "21:00")]
        H21 => "21:00",
    }
}

/// A trainer time-slot booking.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: Uuid,
    pub member_id: Uuid,
    pub trainer_id: Uuid,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub member_id: Uuid,
    pub trainer_id: Uuid,
    pub date: NaiveDate,
    pub time: TimeSlot,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBookingInput {
    /// Session pack to draw from, if the visit should be charged.
    pub ticket_id: Option<Uuid>,
}

/// A delivered booking and the session pack it was charged to, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedBooking {
    pub schedule: Schedule,
    pub ticket: Option<super::ticket::Ticket>,
}
