use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One user's rating and note for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DayRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "record_date")]
    pub date: NaiveDate,
    pub rating: i16,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DayRecord {
    /// True when the note has visible content.
    pub fn has_note(&self) -> bool {
        self.note
            .as_deref()
            .map(|n| !n.trim().is_empty())
            .unwrap_or(false)
    }
}

/// The user-facing part of a record, attached to calendar cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayEntry {
    pub rating: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&DayRecord> for DayEntry {
    fn from(r: &DayRecord) -> Self {
        Self {
            rating: r.rating,
            note: r.note.clone(),
            updated_at: r.updated_at,
        }
    }
}
