use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum InquiryCategory {
        #[default]
        General => "general",
        Facility => "facility",
        Ticket => "ticket",
        Pt => "pt",
        Refund => "refund",
        Other => "other",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum InquiryStatus {
        Pending => "pending",
        Answered => "answered",
    }
}

/// Free-form question from a member, answered once by staff.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub category: InquiryCategory,
    pub title: String,
    pub content: String,
    pub status: InquiryStatus,
    pub reply: Option<String>,
    pub replied_by: Option<Uuid>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryInput {
    /// Defaults to the caller; admins may file on a member's behalf.
    pub member_id: Option<Uuid>,
    #[serde(default)]
    pub category: InquiryCategory,
    pub title: String,
    pub content: String,
}

impl InquiryInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("inquiry title is required".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("inquiry content is required".to_string());
        }
        Ok(())
    }
}

impl Inquiry {
    pub fn new(member_id: Uuid, input: InquiryInput, created_at: DateTime<Utc>) -> Self {
        Inquiry {
            id: Uuid::new_v4(),
            member_id,
            category: input.category,
            title: input.title.trim().to_string(),
            content: input.content.trim().to_string(),
            status: InquiryStatus::Pending,
            reply: None,
            replied_by: None,
            replied_at: None,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyInput {
    pub reply: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryFilter {
    pub member_id: Option<Uuid>,
    pub status: Option<InquiryStatus>,
}
