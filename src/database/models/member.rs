use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub memo: Option<String>,
    /// Reciprocal side of the locker assignment; kept in step with
    /// `lockers.member_id` by the locker allocator.
    pub has_locker: bool,
    pub locker_number: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub memo: Option<String>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum Gender {
        Male => "male",
        Female => "female",
        Other => "other",
    }
}

impl MemberInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("member name is required".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("member phone is required".to_string());
        }
        Ok(())
    }
}

impl Member {
    pub fn new(input: MemberInput, created_at: DateTime<Utc>) -> Self {
        Member {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email,
            gender: input.gender,
            birth_date: input.birth_date,
            address: input.address,
            emergency_contact: input.emergency_contact,
            memo: input.memo,
            has_locker: false,
            locker_number: None,
            created_at,
        }
    }
}

/// Front-desk sign-up: the member plus any plans bought at the counter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    pub member: MemberInput,
    pub membership_plan_id: Option<String>,
    pub pt_plan_id: Option<String>,
    pub locker_plan_id: Option<String>,
    /// Explicit locker choice; the lowest free number is used when absent.
    pub locker_number: Option<i32>,
    pub start_date: NaiveDate,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub member: Member,
    pub issuances: Vec<super::sale::Issuance>,
    pub locker: Option<super::locker::LockerView>,
}
