//! Month grid generation.
//!
//! A grid is a list of Monday→Sunday weeks covering one month. Leading and
//! trailing gaps are filled with days of the adjacent months so every week
//! has exactly seven cells.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const DAYS_PER_WEEK: usize = 7;

/// A validated (year, month) pair with `month` in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

/// Inclusive range of years the calendar accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub min: i32,
    pub max: i32,
}

impl YearWindow {
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        // neighbouring months must be representable for padding
        NaiveDate::from_ymd_opt(year.checked_sub(1)?, 1, 1)?;
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 12, 31)?;
        Some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Resolve a requested month the way the calendar page does: a month
    /// outside `1..=12` falls back to today's month, a year outside the
    /// window falls back to today's year. Missing values mean "today".
    pub fn resolve(
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
        window: YearWindow,
    ) -> Self {
        let month = month
            .filter(|m| (1..=12).contains(m))
            .unwrap_or_else(|| today.month());
        let year = year
            .filter(|y| window.contains(*y))
            .unwrap_or_else(|| today.year());
        Self::new(year, month).unwrap_or_else(|| Self::of(today))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day() + chrono::Duration::days(i64::from(self.days_in_month()) - 1)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        let days = next.first_day().signed_duration_since(self.first_day()).num_days();
        days as u32
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

pub const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
}

/// Weeks of exactly [`DAYS_PER_WEEK`] cells, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub weeks: Vec<Vec<DayCell>>,
}

impl MonthGrid {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }
}

/// Build the grid for `ym`. `today` only drives the `is_today` flag and is
/// never set on padding cells.
pub fn build(ym: YearMonth, today: NaiveDate) -> MonthGrid {
    let first = ym.first_day();
    let leading = first.weekday().number_from_monday() - 1;

    let prev = ym.previous();
    let prev_days = prev.days_in_month();

    let mut cells: Vec<DayCell> = Vec::with_capacity(6 * DAYS_PER_WEEK);

    for offset in (1..=leading).rev() {
        let day = prev_days - offset + 1;
        cells.push(padding_cell(prev, day));
    }

    for day in 1..=ym.days_in_month() {
        let date = first + chrono::Duration::days(i64::from(day) - 1);
        cells.push(DayCell {
            day,
            date,
            is_current_month: true,
            is_today: date == today,
        });
    }

    let next = ym.next();
    let mut day = 1;
    while cells.len() % DAYS_PER_WEEK != 0 {
        cells.push(padding_cell(next, day));
        day += 1;
    }

    let weeks = cells
        .chunks(DAYS_PER_WEEK)
        .map(|week| week.to_vec())
        .collect();

    MonthGrid { weeks }
}

fn padding_cell(ym: YearMonth, day: u32) -> DayCell {
    DayCell {
        day,
        date: ym.first_day() + chrono::Duration::days(i64::from(day) - 1),
        is_current_month: false,
        is_today: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    const WINDOW: YearWindow = YearWindow {
        min: 2020,
        max: 2030,
    };

    #[test]
    fn test_every_grid_is_whole_weeks_from_monday_to_sunday() {
        let today = date("2025-06-15");
        for year in 1999..=2031 {
            for month in 1..=12 {
                let grid = build(ym(year, month), today);
                let cells: Vec<_> = grid.cells().collect();

                assert_eq!(cells.len() % DAYS_PER_WEEK, 0, "{year}-{month}");
                assert!(grid.weeks.iter().all(|w| w.len() == DAYS_PER_WEEK));
                assert_eq!(cells[0].date.weekday(), Weekday::Mon, "{year}-{month}");
                assert_eq!(
                    cells[cells.len() - 1].date.weekday(),
                    Weekday::Sun,
                    "{year}-{month}"
                );
                // consecutive calendar days, no gaps or repeats
                for pair in cells.windows(2) {
                    assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
                }
            }
        }
    }

    #[test]
    fn test_current_month_cells_match_month_length() {
        let today = date("2025-06-15");
        let count = |y, m| {
            build(ym(y, m), today)
                .cells()
                .filter(|c| c.is_current_month)
                .count()
        };

        assert_eq!(count(2024, 2), 29);
        assert_eq!(count(2023, 2), 28);
        assert_eq!(count(2000, 2), 29);
        assert_eq!(count(2100, 2), 28);
        assert_eq!(count(2025, 4), 30);
        assert_eq!(count(2025, 12), 31);
    }

    #[test]
    fn test_current_month_days_are_contiguous_and_ordered() {
        let grid = build(ym(2025, 1), date("2025-06-15"));
        let days: Vec<u32> = grid
            .cells()
            .filter(|c| c.is_current_month)
            .map(|c| c.day)
            .collect();
        assert_eq!(days, (1..=31).collect::<Vec<_>>());
    }

    #[test]
    fn test_january_2024_starts_on_the_first_and_pads_into_february() {
        let grid = build(ym(2024, 1), date("2025-06-15"));
        let cells: Vec<_> = grid.cells().collect();

        assert_eq!(cells[0].date, date("2024-01-01"));
        assert!(cells[0].is_current_month);
        assert_eq!(grid.weeks.len(), 5);

        let last_week = &grid.weeks[4];
        let trailing: Vec<_> = last_week
            .iter()
            .filter(|c| !c.is_current_month)
            .map(|c| c.date)
            .collect();
        assert_eq!(
            trailing,
            vec![
                date("2024-02-01"),
                date("2024-02-02"),
                date("2024-02-03"),
                date("2024-02-04"),
            ]
        );
    }

    #[test]
    fn test_january_borrows_leading_days_from_previous_december() {
        let grid = build(ym(2025, 1), date("2025-06-15"));
        let first_week = &grid.weeks[0];

        assert_eq!(first_week[0].date, date("2024-12-30"));
        assert_eq!(first_week[0].day, 30);
        assert_eq!(first_week[1].date, date("2024-12-31"));
        assert!(!first_week[0].is_current_month);
        assert_eq!(first_week[2].date, date("2025-01-01"));
        assert!(first_week[2].is_current_month);
    }

    #[test]
    fn test_december_pads_into_next_january() {
        let grid = build(ym(2025, 12), date("2025-06-15"));
        let cells: Vec<_> = grid.cells().collect();

        assert_eq!(cells[0].date, date("2025-12-01"));
        assert_eq!(cells[cells.len() - 1].date, date("2026-01-04"));
        assert_eq!(cells[cells.len() - 4].date, date("2026-01-01"));
        assert_eq!(cells[cells.len() - 4].day, 1);
    }

    #[test]
    fn test_month_ending_on_sunday_gets_no_trailing_week() {
        // March 2024 ends on Sunday the 31st
        let grid = build(ym(2024, 3), date("2025-06-15"));
        let last = grid.cells().last().unwrap();
        assert_eq!(last.date, date("2024-03-31"));
        assert!(last.is_current_month);
        assert_eq!(grid.weeks.len(), 5);
    }

    #[test]
    fn test_four_week_february_needs_no_padding() {
        // February 2021 runs Monday 1st to Sunday 28th
        let grid = build(ym(2021, 2), date("2025-06-15"));
        assert_eq!(grid.weeks.len(), 4);
        assert!(grid.cells().all(|c| c.is_current_month));
    }

    #[test]
    fn test_today_is_flagged_only_inside_the_month() {
        let grid = build(ym(2024, 1), date("2024-01-17"));
        let flagged: Vec<_> = grid.cells().filter(|c| c.is_today).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].date, date("2024-01-17"));

        // 2024-02-01 is drawn as padding in January's grid
        let grid = build(ym(2024, 1), date("2024-02-01"));
        assert!(grid.cells().all(|c| !c.is_today));
    }

    #[test]
    fn test_year_month_rejects_out_of_range_months() {
        assert!(YearMonth::new(2024, 0).is_none());
        assert!(YearMonth::new(2024, 13).is_none());
        assert!(YearMonth::new(2024, 12).is_some());
    }

    #[test]
    fn test_year_month_rolls_over_year_boundaries() {
        assert_eq!(ym(2024, 1).previous(), ym(2023, 12));
        assert_eq!(ym(2024, 12).next(), ym(2025, 1));
        assert_eq!(ym(2024, 6).next(), ym(2024, 7));
        assert_eq!(ym(2024, 2).last_day(), date("2024-02-29"));
        assert_eq!(ym(2023, 12).last_day(), date("2023-12-31"));
    }

    #[test]
    fn test_resolve_falls_back_to_today_for_out_of_window_values() {
        let today = date("2026-10-18");

        assert_eq!(YearMonth::resolve(Some(2024), Some(3), today, WINDOW), ym(2024, 3));
        assert_eq!(YearMonth::resolve(None, None, today, WINDOW), ym(2026, 10));
        assert_eq!(YearMonth::resolve(Some(2024), Some(13), today, WINDOW), ym(2024, 10));
        assert_eq!(YearMonth::resolve(Some(2024), Some(0), today, WINDOW), ym(2024, 10));
        assert_eq!(YearMonth::resolve(Some(2019), Some(5), today, WINDOW), ym(2026, 5));
        assert_eq!(YearMonth::resolve(Some(2031), Some(5), today, WINDOW), ym(2026, 5));
    }
}
