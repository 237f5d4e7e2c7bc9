use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::dto::{
    parse_iso_date, DayRangeQuery, DeleteDayResponse, SaveDayRequest, INVALID_DATE_MESSAGE,
};
use crate::error::{AppError, AppResult};
use crate::models::day_record::DayRecord;
use crate::AppState;

pub async fn list_days(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DayRangeQuery>,
) -> AppResult<Json<Vec<DayRecord>>> {
    let (start, end) = query.range(super::today())?;

    let records = state
        .repo
        .records_in_range(auth_user.id, start, end)
        .await?;

    Ok(Json(records))
}

pub async fn get_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(raw_date): Path<String>,
) -> AppResult<Json<DayRecord>> {
    let date =
        parse_iso_date(&raw_date).ok_or_else(|| AppError::validation(INVALID_DATE_MESSAGE))?;

    let record = state
        .repo
        .find_record(auth_user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No entry for {date}")))?;

    Ok(Json(record))
}

/// Create or overwrite the entry for a day.
pub async fn save_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SaveDayRequest>,
) -> AppResult<Json<DayRecord>> {
    let day = body.into_valid()?;

    let record = state
        .repo
        .upsert_record(auth_user.id, day.date, day.rating, day.note)
        .await?;

    tracing::info!(
        user_id = %auth_user.id,
        date = %record.date,
        rating = record.rating,
        "Day saved"
    );

    Ok(Json(record))
}

/// Deleting a day without an entry succeeds with `deleted: false`.
pub async fn delete_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(raw_date): Path<String>,
) -> AppResult<Json<DeleteDayResponse>> {
    let date =
        parse_iso_date(&raw_date).ok_or_else(|| AppError::validation(INVALID_DATE_MESSAGE))?;

    let deleted = state.repo.delete_record(auth_user.id, date).await?;
    if deleted {
        tracing::info!(user_id = %auth_user.id, date = %date, "Day deleted");
    }

    Ok(Json(DeleteDayResponse { deleted, date }))
}
