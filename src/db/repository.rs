use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::day_record::DayRecord;
use crate::models::user::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage for day records, keyed by (user, date).
#[async_trait]
pub trait DayRepository: Send + Sync {
    /// Records with `start <= date <= end`, oldest first.
    async fn records_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<DayRecord>>;

    /// Every record the user owns, oldest first.
    async fn all_records(&self, user_id: Uuid) -> RepositoryResult<Vec<DayRecord>>;

    async fn find_record(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DayRecord>>;

    /// Insert the record or overwrite rating and note in place.
    /// `created_at` survives an update; `updated_at` is refreshed.
    async fn upsert_record(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        rating: i16,
        note: Option<String>,
    ) -> RepositoryResult<DayRecord>;

    /// Returns whether a record was removed.
    async fn delete_record(&self, user_id: Uuid, date: NaiveDate) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_active_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    async fn find_user(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Fails with [`RepositoryError::Conflict`] when the username is taken.
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;

    async fn record_login(&self, id: Uuid) -> RepositoryResult<()>;

    /// Accounts are never deleted, only deactivated. Returns whether the
    /// user exists.
    async fn set_user_active(&self, id: Uuid, active: bool) -> RepositoryResult<bool>;
}

/// Everything the HTTP layer needs from a backend.
#[async_trait]
pub trait FullRepository: DayRepository + UserRepository {
    async fn health_check(&self) -> RepositoryResult<()>;
}
