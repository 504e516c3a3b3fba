use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::PlanKind;
use crate::services::status::EntitlementStatus;

/// A purchased entitlement: membership, locker rental or PT session pack.
///
/// `remaining` holds days for day-counted plans (informational, the live
/// value is derived from `end_date`) and sessions left for PT packs, where it
/// always equals `total_sessions - used_sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_id: String,
    pub plan_name: String,
    pub kind: PlanKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub remaining: i32,
    pub total_sessions: i32,
    pub used_sessions: i32,
    pub trainer_id: Option<Uuid>,
    pub price: i64,
    pub payment_method: String,
    pub request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_session_pack(&self) -> bool {
        self.kind == PlanKind::Pt
    }

    pub fn remaining_sessions(&self) -> i32 {
        self.total_sessions - self.used_sessions
    }

    pub fn has_degenerate_window(&self) -> bool {
        self.start_date == self.end_date
    }
}

/// Ticket together with its read-time status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub days_remaining: i64,
    pub status: EntitlementStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTicketInput {
    pub member_id: Uuid,
    pub plan_id: String,
    pub start_date: NaiveDate,
    pub payment_method: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTrainerInput {
    pub trainer_id: Uuid,
}

/// A ticket whose end date was rewritten by the degenerate-window repair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRepair {
    pub ticket_id: Uuid,
    pub plan_name: String,
    pub start_date: NaiveDate,
    pub old_end_date: NaiveDate,
    pub new_end_date: NaiveDate,
}
