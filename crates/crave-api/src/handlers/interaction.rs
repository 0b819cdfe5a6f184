//! Favorites, ratings and comments. Every route needs a logged-in user.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use crave_economy::{EconomyError, RatingValue};
use crave_types::{CommentWithUser, GameId};
use serde::{Deserialize, Serialize};

use super::{ApiJson, ApiPath, parse_uuid};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Longest accepted comment, in characters, after trimming.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Body of `POST /api/rate/{id}`.
///
/// The value is kept as raw JSON so fractional and non-numeric ratings
/// get the same answer as out-of-range ones.
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    /// Requested rating.
    #[serde(default)]
    pub rating: serde_json::Value,
}

/// Body of `POST /api/comment/{id}`.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Comment text.
    #[serde(default)]
    pub content: String,
}

/// Body of `POST /api/favorite/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    /// Favorite state after the toggle.
    pub is_favorite: bool,
}

/// Body of `POST /api/rate/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    /// Always `true`.
    pub success: bool,
    /// Recomputed mean of all ratings.
    pub average_rating: f64,
    /// Number of ratings.
    pub rating_count: u32,
}

fn game_not_found() -> ApiError {
    ApiError::not_found("Game not found")
}

/// `POST /api/favorite/{id}` -- toggle the favorite flag.
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    ApiPath(id_str): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let game_id = GameId::from(parse_uuid(&id_str)?);
    let is_favorite = state
        .store
        .toggle_favorite(user.id, game_id)
        .await?
        .ok_or_else(game_not_found)?;
    Ok(Json(FavoriteResponse { is_favorite }))
}

/// `POST /api/rate/{id}` -- rate a game 1-5, replacing any earlier rating.
pub async fn rate_game(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    ApiPath(id_str): ApiPath<String>,
    ApiJson(req): ApiJson<RateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let game_id = GameId::from(parse_uuid(&id_str)?);
    let value = req
        .rating
        .as_i64()
        .ok_or(EconomyError::RatingOutOfRange)
        .and_then(RatingValue::new)?;

    let summary = state
        .store
        .submit_rating(user.id, game_id, value)
        .await?
        .ok_or_else(game_not_found)?;
    Ok(Json(RateResponse {
        success: true,
        average_rating: summary.average_rating,
        rating_count: summary.rating_count,
    }))
}

/// `POST /api/comment/{id}` -- post a comment.
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    ApiPath(id_str): ApiPath<String>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let game_id = GameId::from(parse_uuid(&id_str)?);
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation(String::from("Comment cannot be empty")));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::Validation(format!(
            "Comment must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }

    let comment = state
        .store
        .add_comment(user.id, game_id, content.to_owned())
        .await?
        .ok_or_else(game_not_found)?;
    Ok(Json(CommentWithUser {
        comment,
        username: user.username,
    }))
}

/// `GET /api/favorites` -- the user's favorite games.
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_favorite_games(user.id).await?))
}
