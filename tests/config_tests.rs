use std::env;
use std::io::Write;

use gymkeeper::PlanCatalog;
use gymkeeper::config::Config;
use pretty_assertions::assert_eq;
use serial_test::serial;

mod common;

const KEYS: [&str; 9] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "LOCKER_POOL_SIZE",
    "EXPIRING_THRESHOLD_DAYS",
    "PT_VALIDITY_DAYS",
    "PLAN_CATALOG_PATH",
];

// Clears the variables for the duration of `f`, then restores them
fn with_clean_env<F: FnOnce()>(f: F) {
    let saved: Vec<(&str, Option<String>)> = KEYS.iter().map(|k| (*k, env::var(k).ok())).collect();
    for key in KEYS {
        unsafe { env::remove_var(key) };
    }

    f();

    for (key, value) in saved {
        unsafe {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_defaults() {
    common::setup_test_env();
    with_clean_env(|| {
        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite:./gymkeeper.db");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.locker_pool_size, 200);
        assert_eq!(config.expiring_threshold_days, 7);
        assert_eq!(config.pt_validity_days, 180);
        assert!(config.plan_catalog_path.is_none());
        assert!(config.is_development());
    });
}

#[test]
#[serial]
fn test_config_custom_values() {
    common::setup_test_env();
    with_clean_env(|| {
        unsafe {
            env::set_var("DATABASE_URL", "sqlite:./other.db");
            env::set_var("PORT", "3000");
            env::set_var("ENVIRONMENT", "production");
            env::set_var("LOCKER_POOL_SIZE", "50");
            env::set_var("EXPIRING_THRESHOLD_DAYS", "14");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite:./other.db");
        assert_eq!(config.port, 3000);
        assert_eq!(config.locker_pool_size, 50);
        assert_eq!(config.expiring_threshold_days, 14);
        assert!(config.is_production());
        assert_eq!(config.server_address(), "127.0.0.1:3000");
    });
}

#[test]
#[serial]
fn test_config_rejects_empty_locker_pool() {
    common::setup_test_env();
    with_clean_env(|| {
        unsafe { env::set_var("LOCKER_POOL_SIZE", "0") };
        assert!(Config::from_env_only().is_err());
    });
}

#[test]
#[serial]
fn test_config_loads_plan_catalog_file() {
    common::setup_test_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"id": "day-pass", "name": "Day pass", "kind": "membership", "term": {{"unit": "days", "value": 1}}, "price": 10000}}]"#
    )
    .unwrap();

    with_clean_env(|| {
        unsafe { env::set_var("PLAN_CATALOG_PATH", file.path()) };
        let config = Config::from_env_only().unwrap();

        let json = config.read_plan_catalog().unwrap().unwrap();
        let catalog = PlanCatalog::from_json(&json, config.pt_validity_days).unwrap();
        assert_eq!(catalog.plans().len(), 1);
        assert_eq!(catalog.find("day-pass").map(|p| p.price), Some(10_000));
    });
}

#[test]
#[serial]
fn test_missing_plan_catalog_file_is_an_error() {
    common::setup_test_env();
    with_clean_env(|| {
        unsafe { env::set_var("PLAN_CATALOG_PATH", "/definitely/not/here.json") };
        let config = Config::from_env_only().unwrap();
        assert!(config.read_plan_catalog().is_err());
    });
}
