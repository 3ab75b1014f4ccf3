use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::require_db;
use crate::error::AppError;
use crate::services::counter;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct CounterResponse {
    count: i32,
}

#[derive(Debug, Deserialize)]
struct IncrementRequest {
    increment: i32,
}

async fn get_count(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let count = counter::current_count(db).await?;
    Ok(HttpResponse::Ok().json(CounterResponse { count }))
}

async fn put_increment(
    app_state: web::Data<AppState>,
    body: web::Json<IncrementRequest>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let count = counter::increment(db, body.increment).await?;
    Ok(HttpResponse::Ok().json(CounterResponse { count }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(get_count))
        .route("", web::put().to(put_increment));
}
