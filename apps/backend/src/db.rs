use db_bootstrap::Db;
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Centralized helper to access the database connection from AppState.
///
/// This is the canonical way to access the database from application code.
/// When the bootstrap skipped connecting, the placeholder fails here, at
/// the point of use, never earlier.
pub fn require_db(state: &AppState) -> Result<&DatabaseConnection, AppError> {
    match state.db() {
        Db::Connected(conn) => Ok(conn),
        Db::Unavailable(reason) => Err(AppError::db_unavailable(format!(
            "database connection was skipped ({})",
            reason.as_str()
        ))),
    }
}
