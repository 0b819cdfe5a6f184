//! Public catalog reads: categories, game lists, the home page and the
//! game detail view.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use crave_types::{Category, CommentWithUser, Game, GameId};
use serde::{Deserialize, Serialize};

use super::{ApiPath, ApiQuery, parse_uuid};
use crate::auth::MaybeUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Games shown per category on the home page.
pub const HOME_GAMES_PER_CATEGORY: usize = 10;

/// Related games shown on a game's detail view.
pub const RELATED_GAMES_LIMIT: usize = 8;

/// Query parameters for `GET /api/games`.
#[derive(Debug, Default, Deserialize)]
pub struct GamesQuery {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
}

/// One row of the home page.
#[derive(Debug, Serialize)]
pub struct CategoryGames {
    /// The category.
    pub category: Category,
    /// Up to [`HOME_GAMES_PER_CATEGORY`] of its games.
    pub games: Vec<Game>,
}

/// Body of `GET /api/home`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    /// Games flagged trending.
    pub trending_games: Vec<Game>,
    /// Non-empty categories with a sample of their games.
    pub games_by_category: Vec<CategoryGames>,
}

/// Body of `GET /api/game/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    /// The game, including this view in its play count.
    pub game: Game,
    /// Comments, newest first.
    pub comments: Vec<CommentWithUser>,
    /// Other games in the same category.
    pub related_games: Vec<Game>,
    /// Whether the viewer has favorited the game.
    pub is_favorite: bool,
    /// The viewer's rating, if any.
    pub user_rating: Option<u8>,
}

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_categories().await?))
}

/// `GET /api/games[?search=]`
pub async fn list_games(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<GamesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let games = match search {
        Some(term) => state.store.search_games(term).await?,
        None => state.store.list_games().await?,
    };
    Ok(Json(games))
}

/// `GET /api/home`
pub async fn home(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let trending_games = state.store.list_trending_games().await?;
    let categories = state.store.list_categories().await?;
    let all_games = state.store.list_games().await?;

    let games_by_category = categories
        .into_iter()
        .filter_map(|category| {
            let games: Vec<Game> = all_games
                .iter()
                .filter(|g| g.category_id == category.id)
                .take(HOME_GAMES_PER_CATEGORY)
                .cloned()
                .collect();
            (!games.is_empty()).then_some(CategoryGames { category, games })
        })
        .collect();

    Ok(Json(HomeResponse {
        trending_games,
        games_by_category,
    }))
}

/// `GET /api/category/{name}` -- the games in a category.
pub async fn category_games(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .store
        .find_category_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(Json(state.store.list_games_by_category(category.id).await?))
}

/// `GET /api/game/{id}` -- game detail. Counts as a play.
pub async fn game_detail(
    State(state): State<Arc<AppState>>,
    ApiPath(id_str): ApiPath<String>,
    MaybeUser { user, .. }: MaybeUser,
) -> Result<impl IntoResponse, ApiError> {
    let id = GameId::from(parse_uuid(&id_str)?);
    let game = state
        .store
        .increment_play_count(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;

    let comments = state.store.list_comments(id).await?;
    let related_games = state
        .store
        .list_games_by_category(game.category_id)
        .await?
        .into_iter()
        .filter(|g| g.id != id)
        .take(RELATED_GAMES_LIMIT)
        .collect();

    let (is_favorite, user_rating) = match &user {
        Some(user) => (
            state.store.is_favorite(user.id, id).await?,
            state.store.get_rating(user.id, id).await?.map(|r| r.rating),
        ),
        None => (false, None),
    };

    Ok(Json(GameDetail {
        game,
        comments,
        related_games,
        is_favorite,
        user_rating,
    }))
}
