use db_bootstrap::{Db, SkipReason};

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database handle: live connection or inert placeholder
    db: Db,
}

impl AppState {
    /// Create a new AppState around a bootstrap outcome
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create an AppState whose database was intentionally skipped
    pub fn without_db() -> Self {
        Self {
            db: Db::Unavailable(SkipReason::UrlMissing),
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    #[test]
    fn without_db_carries_a_placeholder() {
        let state = AppState::without_db();
        assert!(!state.db().is_connected());
        assert_eq!(state.db().skip_reason(), Some(SkipReason::UrlMissing));
    }

    #[test]
    fn new_preserves_the_connected_handle() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(Db::Connected(conn));
        assert!(state.db().is_connected());
        assert!(state.db().connection().is_some());
    }
}
