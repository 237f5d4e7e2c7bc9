//! Rating statistics over a user's day records.
//!
//! Range summaries report `average = sum / 12`, i.e. the total spread over the
//! twelve months of a year, not the mean rating. Lifetime summaries spread the
//! total over the number of calendar years that have data.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::grid::YearMonth;
use crate::db::repository::DayRepository;
use crate::models::day_record::DayRecord;

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: i64,
    pub sum: i64,
    pub min: Option<i16>,
    pub max: Option<i16>,
    pub notes_count: i64,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifetimeSummary {
    #[serde(flatten)]
    pub summary: StatsSummary,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub years_spanned: i32,
}

/// Count, sum, extrema and notes over `records`, without a derived average.
pub fn tally(records: &[DayRecord]) -> StatsSummary {
    let mut summary = StatsSummary::default();
    for r in records {
        summary.count += 1;
        summary.sum += i64::from(r.rating);
        summary.min = Some(summary.min.map_or(r.rating, |m| m.min(r.rating)));
        summary.max = Some(summary.max.map_or(r.rating, |m| m.max(r.rating)));
        if r.has_note() {
            summary.notes_count += 1;
        }
    }
    summary
}

/// Range summary with the per-month average.
pub fn summarize_records(records: &[DayRecord]) -> StatsSummary {
    let mut summary = tally(records);
    summary.average = Some(round1(summary.sum as f64 / MONTHS_PER_YEAR));
    summary
}

/// Lifetime summary with the per-year average.
pub fn summarize_lifetime(records: &[DayRecord]) -> LifetimeSummary {
    let mut summary = tally(records);
    let first_year = records.iter().map(|r| r.date.year()).min();
    let last_year = records.iter().map(|r| r.date.year()).max();

    let years_spanned = match (first_year, last_year) {
        (Some(first), Some(last)) => last - first + 1,
        _ => 0,
    };
    let average = if years_spanned > 0 && summary.sum > 0 {
        round1(summary.sum as f64 / f64::from(years_spanned))
    } else {
        0.0
    };
    summary.average = Some(average);

    LifetimeSummary {
        summary,
        first_year,
        last_year,
        years_spanned,
    }
}

/// Round half away from zero to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Runs summaries against a repository.
///
/// A repository failure is logged and reported as an empty summary: callers
/// see "no data" either way.
pub struct StatsAggregator<'a, R: DayRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: DayRepository + ?Sized> StatsAggregator<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    pub async fn summarize(&self, user_id: Uuid, start: NaiveDate, end: NaiveDate) -> StatsSummary {
        let records = match self.repo.records_in_range(user_id, start, end).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    start = %start,
                    end = %end,
                    error = %e,
                    "Stats query failed, reporting empty summary"
                );
                Vec::new()
            }
        };
        summarize_records(&records)
    }

    pub async fn summarize_month(&self, user_id: Uuid, ym: YearMonth) -> StatsSummary {
        self.summarize(user_id, ym.first_day(), ym.last_day()).await
    }

    pub async fn summarize_year(&self, user_id: Uuid, year: i32) -> StatsSummary {
        match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(start), Some(end)) => self.summarize(user_id, start, end).await,
            _ => summarize_records(&[]),
        }
    }

    pub async fn summarize_all(&self, user_id: Uuid) -> LifetimeSummary {
        let records = match self.repo.all_records(user_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Lifetime stats query failed, reporting empty summary"
                );
                Vec::new()
            }
        };
        summarize_lifetime(&records)
    }
}
