//! Credentials, session bookkeeping and request guards.
//!
//! Identity lives in the server-side session: the cookie only carries a
//! signed session id. Route access is expressed through extractors,
//! each one building on the previous:
//!
//! | Extractor     | Requires                                   | Rejection |
//! |---------------|--------------------------------------------|-----------|
//! | [`MaybeUser`] | nothing                                    | --        |
//! | [`AuthUser`]  | a session user that still exists           | 401       |
//! | [`SiteAdmin`] | ... with `isAdmin`                         | 403       |
//! | [`AdminUser`] | ... and a session verified with the admin password | 401 |
//!
//! The two admin conditions are independent predicates,
//! [`require_site_admin`] and [`require_admin_verified`], and
//! [`AdminUser`] is their conjunction.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use crave_types::{User, UserId};
use sha2::{Digest, Sha512};
use tower_sessions::Session;

use crate::error::ApiError;
use crate::state::AppState;

/// Session key holding the logged-in [`UserId`].
pub const USER_ID_KEY: &str = "user_id";

/// Session key set once the admin password has been verified.
pub const ADMIN_VERIFIED_KEY: &str = "admin_verified";

// ---------------------------------------------------------------------------
// Passwords
// ---------------------------------------------------------------------------

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Check a password against a stored bcrypt hash on the blocking pool.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password check failed: {e}")))
}

/// Compare the submitted admin password with the configured one.
///
/// Both sides are reduced to SHA-512 digests first so the comparison
/// always walks the same number of bytes regardless of input lengths.
pub fn admin_password_matches(expected: &str, submitted: &str) -> bool {
    let expected = Sha512::digest(expected.as_bytes());
    let submitted = Sha512::digest(submitted.as_bytes());
    expected
        .iter()
        .zip(submitted.iter())
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

// ---------------------------------------------------------------------------
// Session bookkeeping
// ---------------------------------------------------------------------------

/// Bind `user_id` to the session under a fresh session id.
///
/// Any previous admin verification is dropped along with the old id.
pub async fn start_user_session(session: &Session, user_id: UserId) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.remove::<bool>(ADMIN_VERIFIED_KEY).await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Mark the session as verified for the admin panel.
pub async fn mark_admin_verified(session: &Session) -> Result<(), ApiError> {
    session.insert(ADMIN_VERIFIED_KEY, true).await?;
    Ok(())
}

/// Whether the session has passed the admin password check.
pub async fn is_admin_verified(session: &Session) -> Result<bool, ApiError> {
    Ok(session.get::<bool>(ADMIN_VERIFIED_KEY).await?.unwrap_or(false))
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// The user must be a site admin.
pub fn require_site_admin(user: &User) -> Result<(), ApiError> {
    if user.is_admin {
        return Ok(());
    }
    tracing::warn!(user_id = %user.id, "Admin route refused for non-admin user");
    Err(ApiError::Forbidden(String::from("Admin access required")))
}

/// The session must carry a verified admin password.
pub async fn require_admin_verified(session: &Session) -> Result<(), ApiError> {
    if is_admin_verified(session).await? {
        return Ok(());
    }
    Err(ApiError::Unauthenticated(String::from(
        "Admin password verification required",
    )))
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

async fn session_from_parts(
    parts: &mut Parts,
    state: &Arc<AppState>,
) -> Result<Session, ApiError> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(status, message)| {
            ApiError::Internal(format!("session unavailable ({status}): {message}"))
        })
}

/// The session and, when someone is logged in, their user record.
///
/// A session pointing at a user that no longer exists is destroyed.
#[derive(Debug)]
pub struct MaybeUser {
    /// The request's session.
    pub session: Session,
    /// The logged-in user, if any.
    pub user: Option<User>,
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        let Some(user_id) = session.get::<UserId>(USER_ID_KEY).await? else {
            return Ok(Self {
                session,
                user: None,
            });
        };

        let user = state.store.get_user(user_id).await?;
        if user.is_none() {
            tracing::debug!(%user_id, "Session user no longer exists, destroying session");
            session.flush().await?;
        }
        Ok(Self { session, user })
    }
}

/// A logged-in user. Rejects with 401 otherwise.
#[derive(Debug)]
pub struct AuthUser {
    /// The request's session.
    pub session: Session,
    /// The logged-in user.
    pub user: User,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser { session, user } = MaybeUser::from_request_parts(parts, state).await?;
        let user = user.ok_or_else(ApiError::not_authenticated)?;
        Ok(Self { session, user })
    }
}

/// A logged-in site admin. Rejects with 401 or 403.
#[derive(Debug)]
pub struct SiteAdmin {
    /// The request's session.
    pub session: Session,
    /// The admin user.
    pub user: User,
}

impl FromRequestParts<Arc<AppState>> for SiteAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { session, user } = AuthUser::from_request_parts(parts, state).await?;
        require_site_admin(&user)?;
        Ok(Self { session, user })
    }
}

/// A site admin whose session passed the admin password check.
#[derive(Debug)]
pub struct AdminUser {
    /// The request's session.
    pub session: Session,
    /// The admin user.
    pub user: User,
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let SiteAdmin { session, user } = SiteAdmin::from_request_parts(parts, state).await?;
        require_admin_verified(&session).await?;
        Ok(Self { session, user })
    }
}
