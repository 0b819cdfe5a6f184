//! Registration, login, logout and the current-user probe.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use crave_store::StoreError;
use crave_types::NewUser;
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;

use super::{ApiJson, Success, validate_in_order};
use crate::auth::{self, MaybeUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[serde(default)]
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Plain-text password.
    #[serde(default)]
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
}

/// Body of `POST /api/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
}

fn duplicate_username() -> ApiError {
    ApiError::Conflict(String::from("Username already exists"))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated(String::from("Invalid credentials"))
}

/// `POST /api/register` -- create an account and log it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_in_order(&req, &["username", "password"])?;

    if state
        .store
        .find_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(duplicate_username());
    }

    let password_hash = auth::hash_password(req.password, state.config.bcrypt_cost).await?;
    let is_admin = state.config.is_admin_username(&req.username);
    let user = match state
        .store
        .create_user(NewUser {
            username: req.username,
            password_hash,
            is_admin,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => return Err(duplicate_username()),
        Err(e) => return Err(e.into()),
    };

    auth::start_user_session(&session, user.id).await?;
    tracing::info!(user_id = %user.id, username = %user.username, is_admin, "User registered");
    Ok(Json(user))
}

/// `POST /api/login` -- check credentials and log in.
///
/// Unknown usernames and wrong passwords produce the same response.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = state.store.find_user_by_username(&req.username).await? else {
        return Err(invalid_credentials());
    };
    if !auth::verify_password(req.password, user.password_hash.clone()).await? {
        return Err(invalid_credentials());
    }

    auth::start_user_session(&session, user.id).await?;
    tracing::debug!(user_id = %user.id, "User logged in");
    Ok(Json(user))
}

/// `POST /api/logout` -- destroy the session.
pub async fn logout(session: Session) -> Result<impl IntoResponse, ApiError> {
    session.flush().await?;
    Ok(Json(Success::OK))
}

/// `GET /api/me` -- the logged-in user, or `null`.
#[allow(clippy::unused_async)] // Axum handlers must be async; the extractor does the awaiting.
pub async fn me(MaybeUser { user, .. }: MaybeUser) -> impl IntoResponse {
    Json(user)
}
