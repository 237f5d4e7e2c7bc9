//! # Daymark: Request/Response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Query`    → deserialized from query params
//! - `*Response` / `*View` → serialized to client JSON
//! - Field rules are expressed via `validator` derive macros; every failed
//!   rule becomes one human-readable message in the 422 response.
//! - Body fields default when missing so that a missing field is reported
//!   as a validation message, not as a deserialization error.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::jwt::AccessToken;
use crate::calendar::{DayCell, LifetimeSummary, StatsSummary, YearMonth, YearWindow};
use crate::error::{AppError, AppResult};
use crate::models::day_record::DayEntry;
use crate::models::user::UserProfile;

pub const MAX_NOTE_CHARS: u64 = 5000;
const ISO_DATE: &str = "%Y-%m-%d";

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom = "validate_username")]
    pub username: String,

    #[serde(default)]
    #[validate(custom = "validate_login_password")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: AccessToken,
    pub user: UserProfile,
}

// ============================================================================
// Days
// ============================================================================

/// POST /api/days: create or overwrite the entry for `date`
#[derive(Debug, Deserialize, Validate)]
pub struct SaveDayRequest {
    #[serde(default)]
    #[validate(custom = "validate_iso_date")]
    pub date: String,

    /// Integer 1-5. Integral floats and numeric strings are accepted.
    #[serde(default)]
    #[validate(custom = "validate_rating")]
    pub rating: Value,

    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    pub note: Option<String>,
}

/// A save request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDay {
    pub date: NaiveDate,
    pub rating: i16,
    pub note: Option<String>,
}

/// GET /api/days
#[derive(Debug, Deserialize)]
pub struct DayRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteDayResponse {
    pub deleted: bool,
    pub date: NaiveDate,
}

// ============================================================================
// Calendar & stats
// ============================================================================

/// GET /api/calendar: out-of-range or unparsable values fall back to the
/// current month/year. Kept as raw strings so that `?month=abc` still renders.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// GET /api/stats/month
#[derive(Debug, Default, Deserialize)]
pub struct MonthStatsQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// GET /api/stats/year
#[derive(Debug, Default, Deserialize)]
pub struct YearStatsQuery {
    pub year: Option<String>,
}

/// One grid cell joined with the stored entry for its date.
#[derive(Debug, Serialize)]
pub struct CalendarDay {
    #[serde(flatten)]
    pub cell: DayCell,
    pub entry: Option<DayEntry>,
}

#[derive(Debug, Serialize)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub today: NaiveDate,
    pub weekdays: [&'static str; 7],
    /// `None` when the neighbouring month is outside the accepted years
    pub previous: Option<YearMonth>,
    pub next: Option<YearMonth>,
    pub weeks: Vec<Vec<CalendarDay>>,
    pub month_stats: StatsSummary,
    pub year_stats: StatsSummary,
    pub lifetime_stats: LifetimeSummary,
}

#[derive(Debug, Serialize)]
pub struct MonthStatsResponse {
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub stats: StatsSummary,
}

#[derive(Debug, Serialize)]
pub struct YearStatsResponse {
    pub year: i32,
    #[serde(flatten)]
    pub stats: StatsSummary,
}

// ============================================================================
// Validation helpers
// ============================================================================

impl LoginRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Validation(validation_messages(&e)))
    }
}

impl SaveDayRequest {
    /// Run every rule and return the parsed values, or all messages at once.
    /// The note is trimmed before its length is checked.
    pub fn into_valid(mut self) -> AppResult<ValidDay> {
        self.note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        self.validate()
            .map_err(|e| AppError::Validation(validation_messages(&e)))?;

        let date = parse_iso_date(&self.date)
            .ok_or_else(|| AppError::validation(INVALID_DATE_MESSAGE))?;
        let rating =
            parse_rating(&self.rating).ok_or_else(|| AppError::validation(INVALID_RATING_MESSAGE))?;

        Ok(ValidDay {
            date,
            rating,
            note: self.note,
        })
    }
}

impl CalendarQuery {
    pub fn resolve(&self, today: NaiveDate, window: YearWindow) -> YearMonth {
        YearMonth::resolve(
            parse_query_number(self.year.as_deref()),
            parse_query_number(self.month.as_deref()),
            today,
            window,
        )
    }
}

impl MonthStatsQuery {
    pub fn year_month(&self, window: YearWindow) -> AppResult<YearMonth> {
        let mut errors = Vec::new();
        let year = check_year(self.year.as_deref(), window, &mut errors);
        let month = match self.month.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Month is required".to_string());
                None
            }
            Some(raw) => match raw.parse::<u32>() {
                Ok(m) if (1..=12).contains(&m) => Some(m),
                _ => {
                    errors.push("Month must be between 1 and 12".to_string());
                    None
                }
            },
        };

        match (year, month) {
            (Some(y), Some(m)) if errors.is_empty() => {
                YearMonth::new(y, m).ok_or_else(|| AppError::validation("Year is out of range"))
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

impl YearStatsQuery {
    pub fn year(&self, window: YearWindow) -> AppResult<i32> {
        let mut errors = Vec::new();
        check_year(self.year.as_deref(), window, &mut errors).ok_or(AppError::Validation(errors))
    }
}

impl DayRangeQuery {
    /// Resolve the range, defaulting to the month containing `today`.
    pub fn range(&self, today: NaiveDate) -> AppResult<(NaiveDate, NaiveDate)> {
        let current = YearMonth::of(today);
        let mut errors = Vec::new();

        let start = match self.start_date.as_deref() {
            None => Some(current.first_day()),
            Some(raw) => parse_iso_date(raw).or_else(|| {
                errors.push(format!("start_date: {INVALID_DATE_MESSAGE}"));
                None
            }),
        };
        let end = match self.end_date.as_deref() {
            None => Some(current.last_day()),
            Some(raw) => parse_iso_date(raw).or_else(|| {
                errors.push(format!("end_date: {INVALID_DATE_MESSAGE}"));
                None
            }),
        };

        match (start, end) {
            (Some(start), Some(end)) if start > end => Err(AppError::validation(
                "start_date must not be after end_date",
            )),
            (Some(start), Some(end)) if errors.is_empty() => Ok((start, end)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

pub const INVALID_DATE_MESSAGE: &str = "Date must be a valid calendar date in YYYY-MM-DD format";
pub const INVALID_RATING_MESSAGE: &str = "Rating must be a whole number between 1 and 5";

/// Lenient numeric query parameter: anything unparsable counts as absent.
fn parse_query_number<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw?.trim().parse().ok()
}

/// Required year inside `window`; pushes one message on failure.
fn check_year(raw: Option<&str>, window: YearWindow, errors: &mut Vec<String>) -> Option<i32> {
    let message = match raw.map(str::trim) {
        None | Some("") => "Year is required".to_string(),
        Some(raw) => match raw.parse::<i32>() {
            Ok(y) if window.contains(y) => return Some(y),
            Ok(_) => format!("Year must be between {} and {}", window.min, window.max),
            Err(_) => "Year must be a number".to_string(),
        },
    };
    errors.push(message);
    None
}

/// Strict `YYYY-MM-DD`: the string must round-trip, so `2025-1-5` and
/// `2025-02-30` are both rejected.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, ISO_DATE).ok()?;
    (date.format(ISO_DATE).to_string() == raw).then_some(date)
}

pub fn parse_rating(value: &Value) -> Option<i16> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.fract() != 0.0 || !(1.0..=5.0).contains(&n) {
        return None;
    }
    Some(n as i16)
}

/// Flatten `validator` errors into messages, ordered by field name.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => m.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect()
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut e = ValidationError::new(code);
    e.message = Some(Cow::Borrowed(message));
    e
}

fn validate_iso_date(raw: &str) -> Result<(), ValidationError> {
    parse_iso_date(raw)
        .map(|_| ())
        .ok_or_else(|| rule("date", INVALID_DATE_MESSAGE))
}

fn validate_rating(value: &Value) -> Result<(), ValidationError> {
    parse_rating(value)
        .map(|_| ())
        .ok_or_else(|| rule("rating", INVALID_RATING_MESSAGE))
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(rule("required", "Username is required"));
    }
    if username.chars().count() < 3 {
        return Err(rule("length", "Username must be at least 3 characters"));
    }
    Ok(())
}

fn validate_login_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(rule("required", "Password is required"));
    }
    if password.chars().count() < 6 {
        return Err(rule("length", "Password must be at least 6 characters"));
    }
    Ok(())
}
