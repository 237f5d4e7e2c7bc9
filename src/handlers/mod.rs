pub mod auth;
pub mod calendar;
pub mod days;
pub mod health;
pub mod stats;

use chrono::{NaiveDate, Utc};

/// The server's notion of "today", handed to the calendar core.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
