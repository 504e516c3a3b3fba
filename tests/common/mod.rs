#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web::Data;
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use fake::Fake;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use sqlx::SqlitePool;
use tempfile::TempDir;

use gymkeeper::database::init_database_with;
use gymkeeper::database::models::{Member, MemberInput, Trainer, TrainerColor, TrainerInput};
use gymkeeper::services::{Caller, Claims, FixedClock, Role, members, trainers};
use gymkeeper::{AppState, Config, PlanCatalog};

/// Call once at the top of every test.
pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 2026-01-01 09:00 UTC, the moment every test starts at.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Test context: a throwaway database file, a settable clock and both kinds
// of caller.
pub struct TestContext {
    pub pool: SqlitePool,
    pub state: AppState,
    pub clock: FixedClock,
    pub config: Config,
    pub admin: Caller,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        Self::with_config(Config::test_config()).await
    }

    pub async fn with_config(mut config: Config) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        config.database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database_with(&config.database_url, 5).await?;

        let clock = FixedClock::new(start_time());
        let catalog = PlanCatalog::builtin(config.pt_validity_days);
        let state = AppState::new(pool.clone(), Arc::new(clock.clone()), config.clone(), catalog);

        Ok(TestContext {
            pool,
            state,
            clock,
            config,
            admin: Caller::Admin {
                id: uuid::Uuid::new_v4(),
            },
            _temp_dir: temp_dir,
        })
    }

    pub async fn sale_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn ticket_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn sales_for_ticket(&self, ticket_id: uuid::Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE ticket_id = ?")
            .bind(ticket_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    pub fn as_member(member: &Member) -> Caller {
        Caller::Member { id: member.id }
    }

    pub async fn member(&self) -> Member {
        members::register_member(&self.state, &self.admin, MockData::member())
            .await
            .unwrap()
    }

    pub async fn trainer(&self) -> Trainer {
        trainers::create_trainer(&self.state, &self.admin, MockData::trainer())
            .await
            .unwrap()
    }

    /// App data for building an actix test service.
    pub fn app_data(&self) -> (Data<AppState>, Data<Config>) {
        (Data::new(self.state.clone()), Data::new(self.config.clone()))
    }
}

// Mock data generators
pub struct MockData;

impl MockData {
    pub fn member() -> MemberInput {
        MemberInput {
            name: Name().fake(),
            phone: PhoneNumber().fake(),
            email: None,
            gender: None,
            birth_date: None,
            address: None,
            emergency_contact: None,
            memo: None,
        }
    }

    pub fn trainer() -> TrainerInput {
        TrainerInput {
            name: Name().fake(),
            phone: None,
            specialty: Some("strength".to_string()),
            color: TrainerColor::Green,
        }
    }
}

// Authentication helpers
pub struct AuthHelper;

impl AuthHelper {
    pub fn token(role: Role, id: uuid::Uuid, config: &Config) -> String {
        Claims::new(id, role, Duration::hours(1))
            .encode(&config.jwt_secret)
            .unwrap()
    }

    pub fn bearer(role: Role, id: uuid::Uuid, config: &Config) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", Self::token(role, id, config)))
    }
}
