use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;

use crate::auth::middleware::AuthUser;
use crate::calendar::{build_grid, grid::WEEKDAY_LABELS, StatsAggregator};
use crate::dto::{CalendarDay, CalendarQuery, CalendarView};
use crate::error::AppResult;
use crate::models::day_record::{DayEntry, DayRecord};
use crate::AppState;

/// Month view: the grid joined with the user's entries plus month, year and
/// lifetime statistics.
pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarView>> {
    let today = super::today();
    let window = state.config.year_window();
    let ym = query.resolve(today, window);

    let grid = build_grid(ym, today);

    let records = state
        .repo
        .records_in_range(auth_user.id, ym.first_day(), ym.last_day())
        .await?;
    let by_date: HashMap<NaiveDate, DayRecord> =
        records.into_iter().map(|r| (r.date, r)).collect();

    let weeks = grid
        .weeks
        .into_iter()
        .map(|week| {
            week.into_iter()
                .map(|cell| CalendarDay {
                    entry: by_date.get(&cell.date).map(DayEntry::from),
                    cell,
                })
                .collect()
        })
        .collect();

    let stats = StatsAggregator::new(state.repo.as_ref());
    let month_stats = stats.summarize_month(auth_user.id, ym).await;
    let year_stats = stats.summarize_year(auth_user.id, ym.year()).await;
    let lifetime_stats = stats.summarize_all(auth_user.id).await;

    Ok(Json(CalendarView {
        year: ym.year(),
        month: ym.month(),
        month_name: ym.name(),
        today,
        weekdays: WEEKDAY_LABELS,
        previous: Some(ym.previous()).filter(|p| window.contains(p.year())),
        next: Some(ym.next()).filter(|n| window.contains(n.year())),
        weeks,
        month_stats,
        year_stats,
        lifetime_stats,
    }))
}
