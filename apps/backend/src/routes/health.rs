use actix_web::{web, HttpResponse};
use db_bootstrap::{latest_applied_version, Db};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    app_version: String,
    /// "ok", "unavailable" (skipped on purpose), or "error".
    db: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    migrations: String,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    // Get app version from Cargo.toml
    let app_version = env!("CARGO_PKG_VERSION").to_string();

    // Get current time in ISO 8601 format
    let now = OffsetDateTime::now_utc();
    let time = now
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    // A skipped database is reported, not treated as a failure; the health
    // endpoint stays 200 either way.
    let (db_status, db_error, migrations) = match app_state.db() {
        Db::Connected(db) => {
            // Lightweight query to verify the connection is live
            match db
                .query_one_raw(sea_orm::Statement::from_string(
                    db.get_database_backend(),
                    "SELECT 1 as health_check".to_string(),
                ))
                .await
            {
                Ok(_) => {
                    let migration_version = match latest_applied_version(db).await {
                        Ok(Some(version)) => version.to_string(),
                        Ok(None) => "no_migrations".to_string(),
                        Err(_) => "unknown".to_string(),
                    };
                    ("ok".to_string(), None, migration_version)
                }
                Err(e) => (
                    "error".to_string(),
                    Some(format!("DB query failed: {e}")),
                    "unknown".to_string(),
                ),
            }
        }
        Db::Unavailable(reason) => (
            "unavailable".to_string(),
            Some(format!("connection skipped: {}", reason.as_str())),
            "unknown".to_string(),
        ),
    };

    let response = HealthResponse {
        status: "ok".to_string(),
        app_version,
        db: db_status,
        db_error,
        migrations,
        time,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
