//! Environment-gated database bootstrap.
//!
//! `DbBootstrap::acquire` decides, in order: skip to a placeholder when no
//! usable URL is configured or the URL is local; reuse the cached handle
//! outside production; otherwise connect once, migrate synchronously, and
//! cache the handle outside production. A placeholder is a successful
//! outcome; code that actually needs the database fails at its point of
//! use, not here.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DbConfig;
use crate::connect::{PgPoolProvider, PoolProvider};
use crate::error::DbBootstrapError;
use crate::migrate::{DirMigrator, SchemaMigrator};
use crate::policy::{is_local_url, parse_db_url, sanitize_db_url, tls_mode};
use crate::pool_cache::PoolSlot;

/// Why the bootstrap skipped connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `DATABASE_URL` is unset or empty.
    UrlMissing,
    /// The URL points at a loopback or host-less local address.
    LoopbackHost,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UrlMissing => "url_missing",
            Self::LoopbackHost => "loopback_host",
        }
    }
}

/// Outcome of the bootstrap: a live handle or an inert placeholder.
#[derive(Debug, Clone)]
pub enum Db {
    Connected(DatabaseConnection),
    Unavailable(SkipReason),
}

impl Db {
    pub fn connection(&self) -> Option<&DatabaseConnection> {
        match self {
            Self::Connected(conn) => Some(conn),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Unavailable(reason) => Some(*reason),
            Self::Connected(_) => None,
        }
    }
}

/// One-shot connection bootstrap. Construction wires the collaborators;
/// `acquire` runs the policy.
pub struct DbBootstrap {
    config: DbConfig,
    provider: Arc<dyn PoolProvider>,
    migrator: Arc<dyn SchemaMigrator>,
    slot: PoolSlot,
}

impl DbBootstrap {
    /// Production wiring: config from the environment, a Postgres pool
    /// provider, migrations from `<working-directory>/migrations`, and the
    /// per-process cache slot.
    pub fn from_env() -> Result<Self, DbBootstrapError> {
        let config = DbConfig::from_env()?;
        Ok(Self::new(
            config,
            Arc::new(PgPoolProvider::default()),
            Arc::new(DirMigrator::from_cwd()?),
            PoolSlot::process(),
        ))
    }

    pub fn new(
        config: DbConfig,
        provider: Arc<dyn PoolProvider>,
        migrator: Arc<dyn SchemaMigrator>,
        slot: PoolSlot,
    ) -> Self {
        Self {
            config,
            provider,
            migrator,
            slot,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Acquire the application's database handle.
    ///
    /// Connect and migration failures propagate unchanged; nothing is
    /// cached on a failed attempt. There is no retry.
    pub async fn acquire(&self) -> Result<Db, DbBootstrapError> {
        let env = self.config.env;

        let Some(url) = self.config.url.as_deref() else {
            info!("bootstrap=skipped reason=url_missing env={}", env.as_str());
            return Ok(Db::Unavailable(SkipReason::UrlMissing));
        };

        let parsed = parse_db_url(url)?;
        if is_local_url(&parsed) {
            info!(
                "bootstrap=skipped reason=loopback_host env={} url={}",
                env.as_str(),
                sanitize_db_url(url)
            );
            return Ok(Db::Unavailable(SkipReason::LoopbackHost));
        }

        if env.caches_connections() {
            if let Some(conn) = self.slot.get() {
                info!("bootstrap=reuse env={}", env.as_str());
                return Ok(Db::Connected(conn));
            }
        }

        info!(
            "bootstrap=start env={} url={} pid={}",
            env.as_str(),
            sanitize_db_url(url),
            std::process::id()
        );

        let conn = self.provider.connect(url, tls_mode(&parsed)).await?;

        let report = self.migrator.apply(&conn).await?;
        info!(
            "bootstrap=migrated defined={} applied_before={}",
            report.defined, report.applied_before
        );

        if env.caches_connections() {
            self.slot.fill(conn.clone());
        }

        info!("bootstrap=ready env={}", env.as_str());
        Ok(Db::Connected(conn))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::config::RuntimeEnv;
    use crate::migrate::MigrationReport;
    use crate::policy::TlsMode;

    #[derive(Default)]
    struct RecordingProvider {
        connects: AtomicUsize,
        tls_seen: Mutex<Vec<TlsMode>>,
    }

    impl RecordingProvider {
        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }

        fn tls_seen(&self) -> Vec<TlsMode> {
            self.tls_seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl PoolProvider for RecordingProvider {
        async fn connect(
            &self,
            _url: &str,
            tls: TlsMode,
        ) -> Result<DatabaseConnection, DbBootstrapError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.tls_seen.lock().unwrap().push(tls);
            Ok(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
        }
    }

    #[derive(Default)]
    struct RecordingMigrator {
        applies: AtomicUsize,
        fail: bool,
    }

    impl RecordingMigrator {
        fn failing() -> Self {
            Self {
                applies: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn applies(&self) -> usize {
            self.applies.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SchemaMigrator for RecordingMigrator {
        async fn apply(
            &self,
            _db: &DatabaseConnection,
        ) -> Result<MigrationReport, DbBootstrapError> {
            self.applies.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DbBootstrapError::migrate("intentional failure"));
            }
            Ok(MigrationReport {
                defined: 1,
                applied_before: 0,
            })
        }
    }

    struct Harness {
        provider: Arc<RecordingProvider>,
        migrator: Arc<RecordingMigrator>,
        slot: PoolSlot,
        bootstrap: DbBootstrap,
    }

    fn harness(url: Option<&str>, env: RuntimeEnv) -> Harness {
        harness_with_migrator(url, env, RecordingMigrator::default())
    }

    fn harness_with_migrator(
        url: Option<&str>,
        env: RuntimeEnv,
        migrator: RecordingMigrator,
    ) -> Harness {
        let provider = Arc::new(RecordingProvider::default());
        let migrator = Arc::new(migrator);
        let slot = PoolSlot::new();
        let bootstrap = DbBootstrap::new(
            DbConfig::new(url.map(str::to_string), env),
            provider.clone(),
            migrator.clone(),
            slot.clone(),
        );
        Harness {
            provider,
            migrator,
            slot,
            bootstrap,
        }
    }

    const REMOTE_URL: &str = "postgresql://app:pw@db.internal:5432/tally";

    #[tokio::test]
    async fn missing_url_skips_without_io() {
        let h = harness(None, RuntimeEnv::Dev);

        let db = h.bootstrap.acquire().await.unwrap();
        assert_eq!(db.skip_reason(), Some(SkipReason::UrlMissing));
        assert_eq!(h.provider.connects(), 0);
        assert_eq!(h.migrator.applies(), 0);
        assert!(h.slot.is_empty());
    }

    #[tokio::test]
    async fn empty_url_skips_without_io() {
        let h = harness(Some("   "), RuntimeEnv::Dev);

        let db = h.bootstrap.acquire().await.unwrap();
        assert_eq!(db.skip_reason(), Some(SkipReason::UrlMissing));
        assert_eq!(h.provider.connects(), 0);
    }

    #[tokio::test]
    async fn loopback_urls_skip_without_io() {
        for url in [
            "postgresql://app:pw@localhost:5432/tally",
            "postgresql://app:pw@127.0.0.1:5432/tally",
        ] {
            let h = harness(Some(url), RuntimeEnv::Dev);

            let db = h.bootstrap.acquire().await.unwrap();
            assert_eq!(db.skip_reason(), Some(SkipReason::LoopbackHost), "url: {url}");
            assert_eq!(h.provider.connects(), 0, "url: {url}");
            assert_eq!(h.migrator.applies(), 0, "url: {url}");
        }
    }

    #[tokio::test]
    async fn loopback_text_in_database_name_does_not_skip() {
        let h = harness(
            Some("postgresql://app:pw@db.internal:5432/localhost_mirror"),
            RuntimeEnv::Dev,
        );

        let db = h.bootstrap.acquire().await.unwrap();
        assert!(db.is_connected());
        assert_eq!(h.provider.connects(), 1);
    }

    #[tokio::test]
    async fn unparseable_url_is_a_config_error() {
        let h = harness(Some("certainly not a database url"), RuntimeEnv::Dev);

        let err = h.bootstrap.acquire().await.unwrap_err();
        assert!(matches!(err, DbBootstrapError::Config { .. }));
        assert_eq!(h.provider.connects(), 0);
    }

    #[tokio::test]
    async fn fresh_acquire_connects_and_migrates_exactly_once() {
        let h = harness(Some(REMOTE_URL), RuntimeEnv::Dev);

        let db = h.bootstrap.acquire().await.unwrap();
        assert!(db.is_connected());
        assert_eq!(h.provider.connects(), 1);
        assert_eq!(h.migrator.applies(), 1);
    }

    #[tokio::test]
    async fn remote_urls_require_tls() {
        let h = harness(Some(REMOTE_URL), RuntimeEnv::Dev);

        h.bootstrap.acquire().await.unwrap();
        assert_eq!(h.provider.tls_seen(), vec![TlsMode::Require]);
    }

    #[tokio::test]
    async fn non_prod_reuses_the_cached_handle() {
        let h = harness(Some(REMOTE_URL), RuntimeEnv::Dev);

        let first = h.bootstrap.acquire().await.unwrap();
        let second = h.bootstrap.acquire().await.unwrap();
        assert!(first.is_connected());
        assert!(second.is_connected());

        // One connection, one migration run, both results live.
        assert_eq!(h.provider.connects(), 1);
        assert_eq!(h.migrator.applies(), 1);
        assert!(!h.slot.is_empty());
    }

    #[tokio::test]
    async fn test_env_also_reuses_the_cached_handle() {
        let h = harness(Some(REMOTE_URL), RuntimeEnv::Test);

        h.bootstrap.acquire().await.unwrap();
        h.bootstrap.acquire().await.unwrap();
        assert_eq!(h.provider.connects(), 1);
    }

    #[tokio::test]
    async fn prod_never_caches() {
        let h = harness(Some(REMOTE_URL), RuntimeEnv::Prod);

        h.bootstrap.acquire().await.unwrap();
        h.bootstrap.acquire().await.unwrap();

        assert_eq!(h.provider.connects(), 2);
        assert_eq!(h.migrator.applies(), 2);
        assert!(h.slot.is_empty());
    }

    #[tokio::test]
    async fn prod_ignores_a_handle_cached_by_others() {
        // A warm slot must not leak into production acquires.
        let h = harness(Some(REMOTE_URL), RuntimeEnv::Prod);
        h.slot
            .fill(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        h.bootstrap.acquire().await.unwrap();
        assert_eq!(h.provider.connects(), 1);
    }

    #[tokio::test]
    async fn migration_failure_propagates_and_caches_nothing() {
        let h = harness_with_migrator(
            Some(REMOTE_URL),
            RuntimeEnv::Dev,
            RecordingMigrator::failing(),
        );

        let err = h.bootstrap.acquire().await.unwrap_err();
        assert!(matches!(err, DbBootstrapError::Migrate { .. }));
        assert_eq!(h.provider.connects(), 1);
        assert!(h.slot.is_empty());

        // The next acquire starts over instead of reusing anything.
        let err = h.bootstrap.acquire().await.unwrap_err();
        assert!(matches!(err, DbBootstrapError::Migrate { .. }));
        assert_eq!(h.provider.connects(), 2);
    }
}
