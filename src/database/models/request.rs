use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum RequestType {
        Purchase => "purchase",
        Pause => "pause",
        Refund => "refund",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Stored member request; the payload columns used depend on `request_type`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub id: Uuid,
    pub member_id: Uuid,
    pub request_type: RequestType,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub amount: Option<i64>,
    pub pause_start: Option<NaiveDate>,
    pub pause_end: Option<NaiveDate>,
    pub bank: Option<String>,
    pub account: Option<String>,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What a member asks for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RequestPayload {
    #[serde(rename_all = "camelCase")]
    Purchase {
        plan_id: String,
        plan_name: String,
        amount: i64,
    },
    #[serde(rename_all = "camelCase")]
    Pause {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    Refund {
        bank: String,
        account: String,
        reason: String,
    },
}

impl RequestPayload {
    pub fn request_type(&self) -> RequestType {
        match self {
            RequestPayload::Purchase { .. } => RequestType::Purchase,
            RequestPayload::Pause { .. } => RequestType::Pause,
            RequestPayload::Refund { .. } => RequestType::Refund,
        }
    }
}

impl MemberRequest {
    pub fn new(member_id: Uuid, payload: RequestPayload, created_at: DateTime<Utc>) -> Self {
        let mut request = MemberRequest {
            id: Uuid::new_v4(),
            member_id,
            request_type: payload.request_type(),
            plan_id: None,
            plan_name: None,
            amount: None,
            pause_start: None,
            pause_end: None,
            bank: None,
            account: None,
            reason: None,
            status: RequestStatus::Pending,
            decided_by: None,
            decided_at: None,
            created_at,
        };
        match payload {
            RequestPayload::Purchase {
                plan_id,
                plan_name,
                amount,
            } => {
                request.plan_id = Some(plan_id);
                request.plan_name = Some(plan_name);
                request.amount = Some(amount);
            }
            RequestPayload::Pause { start, end, reason } => {
                request.pause_start = Some(start);
                request.pause_end = Some(end);
                request.reason = Some(reason);
            }
            RequestPayload::Refund {
                bank,
                account,
                reason,
            } => {
                request.bank = Some(bank);
                request.account = Some(account);
                request.reason = Some(reason);
            }
        }
        request
    }
}

/// Member-facing request input. Purchase amounts come from the plan catalog,
/// not from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RequestInput {
    #[serde(rename_all = "camelCase")]
    Purchase { plan_id: String },
    #[serde(rename_all = "camelCase")]
    Pause {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    Refund {
        bank: String,
        account: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestInput {
    /// Defaults to the caller; admins may file on a member's behalf.
    pub member_id: Option<Uuid>,
    pub request: RequestInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecision {
    pub request: MemberRequest,
    /// Ticket and sale written by an approved purchase.
    pub issuance: Option<super::sale::Issuance>,
    /// False for approved pause/refund requests: only the request status
    /// changes, the underlying ticket is left as it was.
    pub side_effects_applied: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub member_id: Option<Uuid>,
    pub status: Option<RequestStatus>,
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
}
