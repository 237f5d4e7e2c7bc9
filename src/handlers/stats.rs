use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::calendar::{LifetimeSummary, StatsAggregator};
use crate::dto::{MonthStatsQuery, MonthStatsResponse, YearStatsQuery, YearStatsResponse};
use crate::error::AppResult;
use crate::AppState;

pub async fn month_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MonthStatsQuery>,
) -> AppResult<Json<MonthStatsResponse>> {
    let ym = query.year_month(state.config.year_window())?;
    let stats = StatsAggregator::new(state.repo.as_ref())
        .summarize_month(auth_user.id, ym)
        .await;

    Ok(Json(MonthStatsResponse {
        year: ym.year(),
        month: ym.month(),
        stats,
    }))
}

pub async fn year_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<YearStatsQuery>,
) -> AppResult<Json<YearStatsResponse>> {
    let year = query.year(state.config.year_window())?;
    let stats = StatsAggregator::new(state.repo.as_ref())
        .summarize_year(auth_user.id, year)
        .await;

    Ok(Json(YearStatsResponse { year, stats }))
}

pub async fn lifetime_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<LifetimeSummary>> {
    let stats = StatsAggregator::new(state.repo.as_ref())
        .summarize_all(auth_user.id)
        .await;

    Ok(Json(stats))
}
