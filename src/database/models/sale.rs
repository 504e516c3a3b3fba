use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::PlanKind;

/// Ledger entry. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub member_id: Uuid,
    pub ticket_id: Option<Uuid>,
    pub category: PlanKind,
    pub plan_name: String,
    pub amount: i64,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

/// A ticket and the sale recorded with it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuance {
    pub ticket: super::ticket::Ticket,
    pub sale: Sale,
}
