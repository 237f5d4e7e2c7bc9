use crate::auth::password::hash_password;
use crate::config::AdminBootstrap;
use crate::db::repository::{RepositoryError, UserRepository};
use crate::error::AppResult;
use crate::models::user::NewUser;

/// Create the configured administrator unless the username is already taken.
/// Returns whether an account was created.
pub async fn ensure_admin<R: UserRepository + ?Sized>(
    repo: &R,
    admin: &AdminBootstrap,
) -> AppResult<bool> {
    let new_user = NewUser {
        username: admin.username.clone(),
        full_name: admin.full_name.clone(),
        email: None,
        password_hash: hash_password(&admin.password)?,
    };

    match repo.create_user(new_user).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "Admin account created");
            Ok(true)
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::debug!(username = %admin.username, "Admin account already exists");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db::memory::InMemoryRepository;

    fn admin() -> AdminBootstrap {
        AdminBootstrap {
            username: "admin".into(),
            password: "admin123".into(),
            full_name: "Site Admin".into(),
        }
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let repo = InMemoryRepository::new();

        assert!(ensure_admin(&repo, &admin()).await.unwrap());
        assert!(!ensure_admin(&repo, &admin()).await.unwrap());

        let user = repo.find_active_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.full_name, "Site Admin");
        assert!(verify_password("admin123", &user.password_hash));
    }
}
