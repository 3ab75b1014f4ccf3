//! Schema migrations applied during bootstrap.
//!
//! Migration definitions are plain `<version>_<name>.sql` files read from
//! `<working-directory>/migrations` at bootstrap time; nothing is compiled
//! in. Applying is synchronous with the bootstrap: a handle is never
//! returned while the schema is behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sqlx::migrate::Migrator;
use tracing::info;

use crate::error::DbBootstrapError;

/// Directory under the working directory holding migration files.
pub const MIGRATIONS_DIR: &str = "migrations";

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations defined in the source directory.
    pub defined: usize,
    /// Migrations already recorded as applied before this run.
    pub applied_before: usize,
}

/// Seam for bringing the schema up to date on a fresh connection.
#[async_trait]
pub trait SchemaMigrator: Send + Sync {
    async fn apply(
        &self,
        db: &DatabaseConnection,
    ) -> Result<MigrationReport, DbBootstrapError>;
}

/// Migrator reading SQL files from a filesystem directory at call time.
#[derive(Debug, Clone)]
pub struct DirMigrator {
    dir: PathBuf,
}

impl DirMigrator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The production source: `<working-directory>/migrations`, resolved
    /// when the bootstrap is constructed.
    pub fn from_cwd() -> Result<Self, DbBootstrapError> {
        let cwd = std::env::current_dir().map_err(|e| {
            DbBootstrapError::config(format!("cannot resolve working directory: {e}"))
        })?;
        Ok(Self::new(cwd.join(MIGRATIONS_DIR)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load and parse the migration files without applying them.
    pub async fn load(&self) -> Result<Migrator, DbBootstrapError> {
        Migrator::new(self.dir.clone()).await.map_err(|e| {
            DbBootstrapError::migrate(format!(
                "failed to load migrations from {}: {e}",
                self.dir.display()
            ))
        })
    }
}

#[async_trait]
impl SchemaMigrator for DirMigrator {
    async fn apply(
        &self,
        db: &DatabaseConnection,
    ) -> Result<MigrationReport, DbBootstrapError> {
        if db.get_database_backend() != DatabaseBackend::Postgres {
            return Err(DbBootstrapError::migrate(
                "schema migration requires a Postgres connection",
            ));
        }

        let migrator = self.load().await?;
        let defined = migrator.migrations.len();
        let applied_before = applied_versions(db).await?.len();

        info!(
            "migrate=start dir={} defined={} applied={}",
            self.dir.display(),
            defined,
            applied_before
        );

        let pool = db.get_postgres_connection_pool();
        migrator
            .run(pool)
            .await
            .map_err(|e| DbBootstrapError::migrate(format!("migration run failed: {e}")))?;

        info!("migrate=done up_to_date=true");

        Ok(MigrationReport {
            defined,
            applied_before,
        })
    }
}

/// Versions recorded in the migration bookkeeping table, oldest first.
/// An absent table reads as "nothing applied yet".
pub async fn applied_versions(
    db: &DatabaseConnection,
) -> Result<Vec<i64>, DbBootstrapError> {
    let stmt = Statement::from_string(
        db.get_database_backend(),
        "SELECT version FROM _sqlx_migrations ORDER BY version ASC".to_string(),
    );

    match db.query_all_raw(stmt).await {
        Ok(rows) => rows
            .into_iter()
            .map(|row| {
                row.try_get::<i64>("", "version").map_err(|e| {
                    DbBootstrapError::migrate(format!(
                        "unreadable migration bookkeeping row: {e}"
                    ))
                })
            })
            .collect(),
        Err(DbErr::Exec(_) | DbErr::Query(_)) => Ok(Vec::new()),
        Err(e) => Err(DbBootstrapError::migrate(format!(
            "failed to read applied migrations: {e}"
        ))),
    }
}

/// Latest applied migration version, or `None` before the first run.
pub async fn latest_applied_version(
    db: &DatabaseConnection,
) -> Result<Option<i64>, DbBootstrapError> {
    Ok(applied_versions(db).await?.last().copied())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sea_orm::MockDatabase;

    use super::*;

    fn write_migration(dir: &Path, name: &str, sql: &str) {
        fs::write(dir.join(name), sql).unwrap();
    }

    #[tokio::test]
    async fn load_parses_sql_files_in_version_order() {
        let tmp = tempfile::tempdir().unwrap();
        write_migration(
            tmp.path(),
            "20250823000001_create_counter.sql",
            "CREATE TABLE counter (id integer PRIMARY KEY);",
        );
        write_migration(
            tmp.path(),
            "20250823000002_add_count_column.sql",
            "ALTER TABLE counter ADD COLUMN count integer NOT NULL DEFAULT 0;",
        );

        let migrator = DirMigrator::new(tmp.path()).load().await.unwrap();
        let versions: Vec<i64> = migrator.migrations.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![20250823000001, 20250823000002]);
    }

    #[tokio::test]
    async fn load_of_empty_directory_defines_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let migrator = DirMigrator::new(tmp.path()).load().await.unwrap();
        assert!(migrator.migrations.is_empty());
    }

    #[tokio::test]
    async fn load_of_missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("no_such_dir");

        let err = DirMigrator::new(&missing).load().await.unwrap_err();
        assert!(matches!(err, DbBootstrapError::Migrate { .. }));
        assert!(err.to_string().contains("no_such_dir"));
    }

    #[test]
    fn from_cwd_points_at_the_migrations_subdirectory() {
        let migrator = DirMigrator::from_cwd().unwrap();
        assert!(migrator.dir().ends_with(MIGRATIONS_DIR));
        assert!(migrator.dir().is_absolute());
    }

    #[tokio::test]
    async fn apply_refuses_non_postgres_backends() {
        let tmp = tempfile::tempdir().unwrap();
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let err = DirMigrator::new(tmp.path()).apply(&db).await.unwrap_err();
        assert!(matches!(err, DbBootstrapError::Migrate { .. }));
    }

    #[tokio::test]
    async fn applied_versions_reads_the_bookkeeping_table() {
        let row = |version: i64| {
            std::collections::BTreeMap::from([(
                "version",
                sea_orm::Value::BigInt(Some(version)),
            )])
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(20250823000001), row(20250823000002)]])
            .into_connection();

        let versions = applied_versions(&db).await.unwrap();
        assert_eq!(versions, vec![20250823000001, 20250823000002]);
    }

    #[tokio::test]
    async fn latest_applied_version_takes_the_newest() {
        let row = std::collections::BTreeMap::from([(
            "version",
            sea_orm::Value::BigInt(Some(20250823000001i64)),
        )]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();

        assert_eq!(
            latest_applied_version(&db).await.unwrap(),
            Some(20250823000001)
        );
    }
}
