use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::repository::{
    DayRepository, FullRepository, RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::day_record::DayRecord;
use crate::models::user::{NewUser, User};

/// PostgreSQL backend. Cloning shares the pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DayRepository for PgRepository {
    async fn records_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<DayRecord>> {
        let records = sqlx::query_as::<_, DayRecord>(
            r#"
            SELECT * FROM day_records
            WHERE user_id = $1 AND record_date BETWEEN $2 AND $3
            ORDER BY record_date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn all_records(&self, user_id: Uuid) -> RepositoryResult<Vec<DayRecord>> {
        let records = sqlx::query_as::<_, DayRecord>(
            "SELECT * FROM day_records WHERE user_id = $1 ORDER BY record_date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_record(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DayRecord>> {
        let record = sqlx::query_as::<_, DayRecord>(
            "SELECT * FROM day_records WHERE user_id = $1 AND record_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert_record(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        rating: i16,
        note: Option<String>,
    ) -> RepositoryResult<DayRecord> {
        let record = sqlx::query_as::<_, DayRecord>(
            r#"
            INSERT INTO day_records (id, user_id, record_date, rating, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, record_date) DO UPDATE SET
                rating = EXCLUDED.rating,
                note = EXCLUDED.note,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(rating)
        .bind(&note)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_record(&self, user_id: Uuid, date: NaiveDate) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM day_records WHERE user_id = $1 AND record_date = $2")
            .bind(user_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_active_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = $1 AND is_active = TRUE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, full_name, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("username '{}' already exists", user.username))
            }
            _ => RepositoryError::Database(e),
        })?;

        Ok(created)
    }

    async fn record_login(&self, id: Uuid) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_user_active(&self, id: Uuid, active: bool) -> RepositoryResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FullRepository for PgRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
