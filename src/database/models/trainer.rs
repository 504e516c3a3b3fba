use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub color: TrainerColor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerInput {
    pub name: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    #[serde(default)]
    pub color: TrainerColor,
}

string_enum! {
    /// Display tag used by calendar views.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum TrainerColor {
        #[default]
        Blue => "blue",
        Pink => "pink",
        Green => "green",
        Purple => "purple",
        Orange => "orange",
        Red => "red",
        Teal => "teal",
    }
}

impl TrainerInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("trainer name is required".to_string());
        }
        Ok(())
    }
}
