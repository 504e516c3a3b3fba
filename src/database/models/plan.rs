use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    /// Ticket family; doubles as the sale category.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "lowercase")]
    pub enum PlanKind {
        Membership => "membership",
        Pt => "pt",
        Locker => "locker",
    }
}

/// How long an entitlement lasts: a number of days, or a number of PT sessions
/// redeemable within the nominal PT validity window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "unit", content = "value")]
pub enum PlanTerm {
    Days(i64),
    Sessions(i32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub kind: PlanKind,
    pub term: PlanTerm,
    pub price: i64,
}

impl Plan {
    pub fn days(id: &str, name: &str, kind: PlanKind, duration_days: i64, price: i64) -> Self {
        Plan {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            term: PlanTerm::Days(duration_days),
            price,
        }
    }

    pub fn sessions(id: &str, name: &str, sessions: i32, price: i64) -> Self {
        Plan {
            id: id.to_string(),
            name: name.to_string(),
            kind: PlanKind::Pt,
            term: PlanTerm::Sessions(sessions),
            price,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() || self.name.trim().is_empty() {
            return Err("plan id and name are required".to_string());
        }
        match self.term {
            PlanTerm::Days(days) if days <= 0 => {
                Err(format!("plan {} has non-positive duration {}", self.id, days))
            }
            PlanTerm::Sessions(count) if count <= 0 => {
                Err(format!("plan {} has non-positive session count {}", self.id, count))
            }
            PlanTerm::Sessions(_) if self.kind != PlanKind::Pt => {
                Err(format!("plan {} counts sessions but is not a PT plan", self.id))
            }
            _ if self.price < 0 => Err(format!("plan {} has a negative price", self.id)),
            _ => Ok(()),
        }
    }
}
