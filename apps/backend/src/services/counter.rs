//! Counter domain service.
//!
//! The app keeps a single counter row; reads of a missing row are zero and
//! the first increment creates it.

use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait};
use time::OffsetDateTime;

use crate::entities::counter;
use crate::error::AppError;

const COUNTER_ROW_ID: i32 = 1;

/// Bounds on a single increment request.
pub const MIN_INCREMENT: i32 = 1;
pub const MAX_INCREMENT: i32 = 3;

/// Current count; zero when the row does not exist yet.
pub async fn current_count(db: &DatabaseConnection) -> Result<i32, AppError> {
    let row = counter::Entity::find_by_id(COUNTER_ROW_ID).one(db).await?;
    Ok(row.map(|r| r.count).unwrap_or(0))
}

/// Increment the counter by `amount` and return the new count.
pub async fn increment(db: &DatabaseConnection, amount: i32) -> Result<i32, AppError> {
    if !(MIN_INCREMENT..=MAX_INCREMENT).contains(&amount) {
        return Err(AppError::bad_request(
            "INVALID_INCREMENT",
            format!(
                "increment must be between {MIN_INCREMENT} and {MAX_INCREMENT}, got {amount}"
            ),
        ));
    }

    let now = OffsetDateTime::now_utc();

    match counter::Entity::find_by_id(COUNTER_ROW_ID).one(db).await? {
        Some(row) => {
            let next = row.count.saturating_add(amount);
            let mut active: counter::ActiveModel = row.into();
            active.count = ActiveValue::Set(next);
            active.updated_at = ActiveValue::Set(now);
            active.update(db).await?;
            Ok(next)
        }
        None => {
            let active = counter::ActiveModel {
                id: ActiveValue::Set(COUNTER_ROW_ID),
                count: ActiveValue::Set(amount),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            active.insert(db).await?;
            Ok(amount)
        }
    }
}
