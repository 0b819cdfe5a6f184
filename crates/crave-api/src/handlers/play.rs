//! `GET /api/game/{id}/play` -- the playable content of a game.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use crave_types::GameId;

use super::{ApiPath, parse_uuid};
use crate::error::ApiError;
use crate::state::AppState;

/// Policy sent with inline game documents. The sandbox gives the markup
/// an opaque origin, so it cannot reach the portal's cookies or API.
pub const INLINE_GAME_CSP: &str = "sandbox allow-scripts allow-pointer-lock allow-popups";

/// Serve inline HTML for uploaded and embed games, otherwise redirect to
/// the external URL.
pub async fn play_game(
    State(state): State<Arc<AppState>>,
    ApiPath(id_str): ApiPath<String>,
) -> Result<Response, ApiError> {
    let id = GameId::from(parse_uuid(&id_str)?);
    let game = state
        .store
        .get_game(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;

    let kind = game.kind;
    if let Some(html) = game.html_content.filter(|_| kind.is_inline()) {
        return Ok((
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (header::CONTENT_SECURITY_POLICY, INLINE_GAME_CSP),
            ],
            html,
        )
            .into_response());
    }

    match game.iframe_url {
        Some(url) => Ok(Redirect::temporary(&url).into_response()),
        None => Err(ApiError::not_found("Game content not available")),
    }
}
