use axum::{extract::State, Extension, Json};

use crate::auth::{jwt::create_access_token, middleware::AuthUser, password::verify_password};
use crate::dto::{LoginRequest, LoginResponse};
use crate::error::{AppError, AppResult};
use crate::models::user::UserProfile;
use crate::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    body.check()?;
    let username = body.username.trim();

    let user = state
        .repo
        .find_active_by_username(username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // argon2 verification is CPU-bound and must not run on the async workers
    let password = body.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if !valid {
        tracing::warn!(username = %username, "Login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    if let Err(e) = state.repo.record_login(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to record login time");
    }

    let token = create_access_token(user.id, &user.username, &state.config)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(user),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let user = state
        .repo
        .find_user(auth_user.id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(UserProfile::from(user)))
}
