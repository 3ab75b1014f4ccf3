use db_bootstrap::DbBootstrap;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    bootstrap: Option<DbBootstrap>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self { bootstrap: None }
    }

    pub fn with_database(mut self, bootstrap: DbBootstrap) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    /// Build the state. With a database configured this is the process's
    /// single bootstrap call site; a skipped bootstrap still succeeds and
    /// carries the placeholder into the state.
    pub async fn build(self) -> Result<AppState, AppError> {
        match self.bootstrap {
            Some(bootstrap) => {
                let db = bootstrap.acquire().await?;
                Ok(AppState::new(db))
            }
            None => Ok(AppState::without_db()),
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use db_bootstrap::{DbConfig, DirMigrator, PgPoolProvider, PoolSlot, RuntimeEnv};

    use super::*;

    #[tokio::test]
    async fn build_without_database_yields_a_placeholder() {
        let state = build_state().build().await.unwrap();
        assert!(!state.db().is_connected());
    }

    #[tokio::test]
    async fn build_with_a_skipping_bootstrap_succeeds() {
        let bootstrap = DbBootstrap::new(
            DbConfig::new(None, RuntimeEnv::Test),
            Arc::new(PgPoolProvider::default()),
            Arc::new(DirMigrator::new("migrations")),
            PoolSlot::new(),
        );

        let state = build_state()
            .with_database(bootstrap)
            .build()
            .await
            .unwrap();
        assert!(!state.db().is_connected());
    }
}
