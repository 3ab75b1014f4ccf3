//! Environment-derived configuration for the database bootstrap.
//!
//! Two variables matter here: `APP_ENV` selects the runtime environment
//! (absent means `Dev`), and `DATABASE_URL` carries the Postgres connection
//! string. An empty or whitespace-only `DATABASE_URL` is treated the same
//! as an absent one.

use std::env;

use crate::error::DbBootstrapError;

/// Runtime environment the process runs in, parsed from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Dev,
    Test,
    Prod,
}

impl RuntimeEnv {
    /// Read `APP_ENV`, treating an unset variable as `Dev`.
    /// Unrecognized values are a configuration error, not a fallback.
    pub fn from_env() -> Result<Self, DbBootstrapError> {
        match env::var("APP_ENV") {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(Self::Dev),
        }
    }

    pub fn parse(value: &str) -> Result<Self, DbBootstrapError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(DbBootstrapError::config(format!(
                "unrecognized APP_ENV value: '{other}'"
            ))),
        }
    }

    /// Whether bootstrapped connections may be memoized process-wide.
    /// Production always reconnects; every other environment reuses.
    pub fn caches_connections(self) -> bool {
        !matches!(self, Self::Prod)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Prod => "prod",
        }
    }
}

/// Database configuration snapshot handed to the bootstrap.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection URL; `None` when unset or empty.
    pub url: Option<String>,
    pub env: RuntimeEnv,
}

impl DbConfig {
    /// Normalizing constructor: an empty URL collapses to `None`.
    pub fn new(url: Option<String>, env: RuntimeEnv) -> Self {
        let url = url.filter(|u| !u.trim().is_empty());
        Self { url, env }
    }

    pub fn from_env() -> Result<Self, DbBootstrapError> {
        let env = RuntimeEnv::from_env()?;
        let url = env::var("DATABASE_URL").ok();
        Ok(Self::new(url, env))
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_bootstrap_env() {
        env::remove_var("APP_ENV");
        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn parse_accepts_known_names() {
        assert_eq!(RuntimeEnv::parse("dev").unwrap(), RuntimeEnv::Dev);
        assert_eq!(RuntimeEnv::parse("development").unwrap(), RuntimeEnv::Dev);
        assert_eq!(RuntimeEnv::parse("test").unwrap(), RuntimeEnv::Test);
        assert_eq!(RuntimeEnv::parse("prod").unwrap(), RuntimeEnv::Prod);
        assert_eq!(RuntimeEnv::parse("production").unwrap(), RuntimeEnv::Prod);
        assert_eq!(RuntimeEnv::parse(" Prod ").unwrap(), RuntimeEnv::Prod);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = RuntimeEnv::parse("staging").unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn only_prod_disables_caching() {
        assert!(RuntimeEnv::Dev.caches_connections());
        assert!(RuntimeEnv::Test.caches_connections());
        assert!(!RuntimeEnv::Prod.caches_connections());
    }

    #[test]
    fn empty_url_collapses_to_none() {
        let config = DbConfig::new(Some("".to_string()), RuntimeEnv::Dev);
        assert!(config.url.is_none());

        let config = DbConfig::new(Some("   ".to_string()), RuntimeEnv::Dev);
        assert!(config.url.is_none());

        let config = DbConfig::new(
            Some("postgresql://app@db.internal/tally".to_string()),
            RuntimeEnv::Dev,
        );
        assert_eq!(
            config.url.as_deref(),
            Some("postgresql://app@db.internal/tally")
        );
    }

    #[test]
    #[serial]
    fn from_env_defaults_to_dev_without_app_env() {
        clear_bootstrap_env();

        let config = DbConfig::from_env().unwrap();
        assert_eq!(config.env, RuntimeEnv::Dev);
        assert!(config.url.is_none());
    }

    #[test]
    #[serial]
    fn from_env_reads_both_variables() {
        clear_bootstrap_env();
        env::set_var("APP_ENV", "production");
        env::set_var("DATABASE_URL", "postgresql://app:pw@db.internal:5432/tally");

        let config = DbConfig::from_env().unwrap();
        assert_eq!(config.env, RuntimeEnv::Prod);
        assert_eq!(
            config.url.as_deref(),
            Some("postgresql://app:pw@db.internal:5432/tally")
        );

        clear_bootstrap_env();
    }

    #[test]
    #[serial]
    fn from_env_rejects_garbage_app_env() {
        clear_bootstrap_env();
        env::set_var("APP_ENV", "sandbox");

        assert!(DbConfig::from_env().is_err());

        clear_bootstrap_env();
    }
}
