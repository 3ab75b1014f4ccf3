//! Database bootstrap for the Tally backend.
//!
//! Local development runs without Postgres on purpose: when `DATABASE_URL`
//! is unset or points at the local machine, `DbBootstrap::acquire` returns
//! an inert placeholder instead of connecting, and the rest of the app
//! starts normally. With a real remote URL it connects once, applies the
//! SQL migrations under `<working-directory>/migrations`, and outside
//! production memoizes the handle process-wide.

pub mod bootstrap;
pub mod config;
pub mod connect;
pub mod error;
pub mod migrate;
pub mod policy;
pub mod pool_cache;

pub use bootstrap::{Db, DbBootstrap, SkipReason};
pub use config::{DbConfig, RuntimeEnv};
pub use connect::{PgPoolProvider, PoolProvider, PoolSettings};
pub use error::DbBootstrapError;
pub use migrate::{
    applied_versions, latest_applied_version, DirMigrator, MigrationReport, SchemaMigrator,
    MIGRATIONS_DIR,
};
pub use policy::{is_local_url, parse_db_url, sanitize_db_url, tls_mode, TlsMode};
pub use pool_cache::PoolSlot;
