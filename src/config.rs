use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub locker_pool_size: i32,
    pub expiring_threshold_days: i64,
    pub pt_validity_days: i64,
    pub plan_catalog_path: Option<String>,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let config = Config {
            database_url: var_or("DATABASE_URL", "sqlite:./gymkeeper.db"),
            jwt_secret: var_or(
                "JWT_SECRET",
                "your-super-secret-jwt-key-change-this-in-production-12345",
            ),
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 8080),
            environment: var_or("ENVIRONMENT", "development"),
            locker_pool_size: parsed_or("LOCKER_POOL_SIZE", 200),
            expiring_threshold_days: parsed_or("EXPIRING_THRESHOLD_DAYS", 7),
            pt_validity_days: parsed_or("PT_VALIDITY_DAYS", 180),
            plan_catalog_path: env::var("PLAN_CATALOG_PATH").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Deterministic configuration for tests; points at an in-memory database
    /// that callers usually replace with a temp file.
    pub fn test_config() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            locker_pool_size: 200,
            expiring_threshold_days: 7,
            pt_validity_days: 180,
            plan_catalog_path: None,
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.locker_pool_size > 0,
            "LOCKER_POOL_SIZE must be positive, got {}",
            self.locker_pool_size
        );
        anyhow::ensure!(
            self.pt_validity_days > 0,
            "PT_VALIDITY_DAYS must be positive, got {}",
            self.pt_validity_days
        );
        anyhow::ensure!(
            self.expiring_threshold_days >= 0,
            "EXPIRING_THRESHOLD_DAYS must not be negative"
        );
        Ok(())
    }

    /// Read the optional plan catalog override file.
    pub fn read_plan_catalog(&self) -> Result<Option<String>> {
        match &self.plan_catalog_path {
            Some(path) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("failed to read plan catalog at {}", path)),
            None => Ok(None),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
