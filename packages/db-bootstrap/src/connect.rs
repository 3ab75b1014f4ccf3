//! Pooled Postgres connections for the bootstrap.
//!
//! The sqlx pool is configured first, then handed to SeaORM, so pool sizing
//! and TLS are controlled here rather than left to defaults.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::info;

use crate::error::DbBootstrapError;
use crate::policy::{sanitize_db_url, TlsMode};

/// Seam for establishing the pooled connection. The bootstrap owns the
/// policy (when to connect, with what TLS); implementations own the wire.
#[async_trait]
pub trait PoolProvider: Send + Sync {
    /// Establish a pooled connection to `url`. One attempt; the bootstrap
    /// has no retry policy, so a failure here surfaces directly.
    async fn connect(
        &self,
        url: &str,
        tls: TlsMode,
    ) -> Result<DatabaseConnection, DbBootstrapError>;
}

/// Pool sizing knobs.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

/// Production pool provider: sqlx Postgres pool wrapped by SeaORM.
#[derive(Debug, Clone, Default)]
pub struct PgPoolProvider {
    settings: PoolSettings,
}

impl PgPoolProvider {
    pub fn new(settings: PoolSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PoolProvider for PgPoolProvider {
    async fn connect(
        &self,
        url: &str,
        tls: TlsMode,
    ) -> Result<DatabaseConnection, DbBootstrapError> {
        let ssl_mode = match tls {
            TlsMode::Require => PgSslMode::Require,
            TlsMode::Disable => PgSslMode::Disable,
        };

        let connect_options = PgConnectOptions::from_str(url)
            .map_err(|e| {
                DbBootstrapError::config(format!("invalid Postgres connection URL: {e}"))
            })?
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .min_connections(self.settings.min_connections)
            .max_connections(self.settings.max_connections)
            .acquire_timeout(self.settings.acquire_timeout)
            .idle_timeout(self.settings.idle_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                DbBootstrapError::connect(format!(
                    "failed to connect to {}: {e}",
                    sanitize_db_url(url)
                ))
            })?;

        info!(
            "pool=create engine=postgres url={} tls={} min={} max={}",
            sanitize_db_url(url),
            tls.as_str(),
            self.settings.min_connections,
            self.settings.max_connections
        );

        Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_settings_are_small() {
        let settings = PoolSettings::default();
        assert_eq!(settings.min_connections, 1);
        assert_eq!(settings.max_connections, 5);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn connect_rejects_unparseable_options() {
        let provider = PgPoolProvider::default();
        let err = provider
            .connect("definitely not a url", TlsMode::Disable)
            .await
            .unwrap_err();
        assert!(matches!(err, DbBootstrapError::Config { .. }));
    }
}
