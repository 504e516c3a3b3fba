pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::{Caller, Clock, PlanCatalog, SharedClock, SystemClock};

/// Everything an engine operation needs: storage, time, settings and the
/// plan table. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub clock: SharedClock,
    pub config: Config,
    pub catalog: Arc<PlanCatalog>,
}

impl AppState {
    pub fn new(pool: SqlitePool, clock: SharedClock, config: Config, catalog: PlanCatalog) -> Self {
        Self {
            pool,
            clock,
            config,
            catalog: Arc::new(catalog),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
