use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

/// Authenticated caller, injected into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(token, &state.config)?.claims;
    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(AppError::Unauthorized)?;

    // A valid token is not enough: the account must still exist and be active.
    let user = state
        .repo
        .find_user(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            tracing::warn!(user_id = %claims.sub, "Token presented for missing or inactive user");
            AppError::Unauthorized
        })?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
        expires_at,
    });
    Ok(next.run(req).await)
}
