//! In-memory backend with the same semantics as the PostgreSQL one.
//!
//! Records live in a `BTreeMap` keyed by `(user_id, date)`, which gives the
//! uniqueness constraint and ordered range scans for free.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::{
    DayRepository, FullRepository, RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::day_record::DayRecord;
use crate::models::user::{NewUser, User};

#[derive(Clone, Default)]
pub struct InMemoryRepository {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Default)]
struct MemoryData {
    records: BTreeMap<(Uuid, NaiveDate), DayRecord>,
    users: HashMap<Uuid, User>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DayRepository for InMemoryRepository {
    async fn records_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<DayRecord>> {
        if start > end {
            return Ok(Vec::new());
        }
        let data = self.data.read().await;
        Ok(data
            .records
            .range((user_id, start)..=(user_id, end))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn all_records(&self, user_id: Uuid) -> RepositoryResult<Vec<DayRecord>> {
        let data = self.data.read().await;
        Ok(data
            .records
            .range((user_id, NaiveDate::MIN)..=(user_id, NaiveDate::MAX))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn find_record(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DayRecord>> {
        let data = self.data.read().await;
        Ok(data.records.get(&(user_id, date)).cloned())
    }

    async fn upsert_record(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        rating: i16,
        note: Option<String>,
    ) -> RepositoryResult<DayRecord> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let record = data
            .records
            .entry((user_id, date))
            .and_modify(|r| {
                r.rating = rating;
                r.note = note.clone();
                r.updated_at = now;
            })
            .or_insert_with(|| DayRecord {
                id: Uuid::new_v4(),
                user_id,
                date,
                rating,
                note: note.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn delete_record(&self, user_id: Uuid, date: NaiveDate) -> RepositoryResult<bool> {
        let mut data = self.data.write().await;
        Ok(data.records.remove(&(user_id, date)).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_active_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .values()
            .find(|u| u.username == username && u.is_active)
            .cloned())
    }

    async fn find_user(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let mut data = self.data.write().await;
        if data.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        };
        data.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn record_login(&self, id: Uuid) -> RepositoryResult<()> {
        let mut data = self.data.write().await;
        if let Some(user) = data.users.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_user_active(&self, id: Uuid, active: bool) -> RepositoryResult<bool> {
        let mut data = self.data.write().await;
        Ok(match data.users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl FullRepository for InMemoryRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.into(),
            full_name: "Test User".into(),
            email: None,
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_record_with_latest_values() {
        let repo = InMemoryRepository::new();
        let user = Uuid::new_v4();
        let day = date("2025-03-10");

        let first = repo
            .upsert_record(user, day, 3, Some("first".into()))
            .await
            .unwrap();
        let second = repo
            .upsert_record(user, day, 4, Some("second".into()))
            .await
            .unwrap();
        let third = repo
            .upsert_record(user, day, 4, Some("second".into()))
            .await
            .unwrap();

        let all = repo.all_records(user).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rating, 4);
        assert_eq!(all[0].note.as_deref(), Some("second"));
        assert_eq!(first.id, second.id);
        assert_eq!(second.id, third.id);
        assert_eq!(first.created_at, third.created_at);
    }

    #[tokio::test]
    async fn test_range_is_inclusive_and_scoped_to_user() {
        let repo = InMemoryRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for d in ["2025-01-31", "2025-02-01", "2025-02-28", "2025-03-01"] {
            repo.upsert_record(alice, date(d), 2, None).await.unwrap();
        }
        repo.upsert_record(bob, date("2025-02-10"), 5, None)
            .await
            .unwrap();

        let feb = repo
            .records_in_range(alice, date("2025-02-01"), date("2025-02-28"))
            .await
            .unwrap();
        let dates: Vec<_> = feb.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2025-02-01"), date("2025-02-28")]);

        let empty = repo
            .records_in_range(alice, date("2025-03-02"), date("2025-01-01"))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_whether_a_record_existed() {
        let repo = InMemoryRepository::new();
        let user = Uuid::new_v4();
        let day = date("2024-12-24");
        repo.upsert_record(user, day, 5, None).await.unwrap();

        assert!(repo.delete_record(user, day).await.unwrap());
        assert!(!repo.delete_record(user, day).await.unwrap());
        assert!(repo.find_record(user, day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = InMemoryRepository::new();
        repo.create_user(new_user("maria")).await.unwrap();

        let err = repo.create_user(new_user("maria")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_inactive_users_are_not_found_by_username() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(new_user("jorge")).await.unwrap();

        assert!(repo.set_user_active(user.id, false).await.unwrap());
        assert!(!repo.set_user_active(Uuid::new_v4(), false).await.unwrap());
        assert!(repo
            .find_active_by_username("jorge")
            .await
            .unwrap()
            .is_none());
        assert!(repo.find_user(user.id).await.unwrap().is_some());
    }
}
