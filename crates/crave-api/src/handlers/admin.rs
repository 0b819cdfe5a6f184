//! Admin panel: password verification, the dashboard and catalog CRUD.
//!
//! `verify-password` and `session` need a logged-in site admin
//! ([`SiteAdmin`]); everything else additionally needs the session to
//! have passed the admin password check ([`AdminUser`]).

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use crave_store::{CategoryDeletion, StoreError};
use crave_types::{
    Badge, CategoryId, CategoryPatch, DEFAULT_CATEGORY_ICON, GameId, GamePatch, GameType,
    ItemType, NewCategory, NewGame, NewStoreItem, StoreItemId, StoreItemPatch,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ApiJson, ApiPath, Success, parse_uuid, validate_in_order};
use crate::auth::{self, AdminUser, SiteAdmin};
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/admin/verify-password`.
#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    /// The admin password.
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/admin/games`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Display name.
    #[serde(default)]
    #[validate(length(min = 1, message = "Game name is required"))]
    pub name: String,
    /// Short description.
    pub description: Option<String>,
    /// How to play.
    pub instructions: Option<String>,
    /// Owning category.
    pub category_id: CategoryId,
    /// Card image.
    #[serde(default)]
    #[validate(length(min = 1, message = "Thumbnail URL is required"))]
    pub thumbnail_url: String,
    /// External content URL.
    pub iframe_url: Option<String>,
    /// Inline HTML document.
    pub html_content: Option<String>,
    /// Content delivery mode.
    #[serde(rename = "type", default)]
    pub kind: GameType,
    /// Badge tag (`new`, `hot`); empty for none.
    pub badge: Option<String>,
    /// Trending flag.
    #[serde(rename = "isTrending", default)]
    pub trending: bool,
}

/// Body of `PUT /api/admin/games/{id}`. Absent fields are left alone;
/// an empty string clears a nullable text field.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    /// New name.
    #[validate(length(min = 1, message = "Game name cannot be empty"))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New instructions.
    pub instructions: Option<String>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New card image.
    #[validate(length(min = 1, message = "Thumbnail URL cannot be empty"))]
    pub thumbnail_url: Option<String>,
    /// New content URL.
    pub iframe_url: Option<String>,
    /// New inline HTML.
    pub html_content: Option<String>,
    /// New delivery mode.
    #[serde(rename = "type")]
    pub kind: Option<GameType>,
    /// New badge tag.
    pub badge: Option<String>,
    /// New trending flag.
    #[serde(rename = "isTrending")]
    pub trending: Option<bool>,
}

/// Body of `POST /api/admin/categories`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name, unique ignoring case.
    #[serde(default)]
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    /// Icon name; defaults to the generic gamepad.
    pub icon: Option<String>,
}

/// Body of `PUT /api/admin/categories/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    /// New name.
    #[validate(length(min = 1, message = "Category name cannot be empty"))]
    pub name: Option<String>,
    /// New icon; empty resets to the default icon.
    pub icon: Option<String>,
}

/// Body of `POST /api/admin/store-items`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreItemRequest {
    /// Display name.
    #[serde(default)]
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    /// Item image.
    #[serde(default)]
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    /// Price in Crave Coins.
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
    /// Item kind.
    #[serde(default)]
    pub item_type: ItemType,
}

/// Body of `PUT /api/admin/store-items/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreItemRequest {
    /// New name.
    #[validate(length(min = 1, message = "Item name cannot be empty"))]
    pub name: Option<String>,
    /// New image.
    #[validate(length(min = 1, message = "Image URL cannot be empty"))]
    pub image_url: Option<String>,
    /// New price.
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    /// New kind.
    pub item_type: Option<ItemType>,
}

// ---------------------------------------------------------------------------
// Field normalisation
// ---------------------------------------------------------------------------

fn trim(value: &str) -> String {
    value.trim().to_owned()
}

/// Optional text on creation: blank means absent.
fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Optional text in a patch: absent keeps, blank clears.
fn patch_text(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| (!v.trim().is_empty()).then_some(v))
}

fn parse_badge(tag: &str) -> Result<Option<Badge>, ApiError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Ok(None);
    }
    Badge::from_tag(tag)
        .map(Some)
        .ok_or_else(|| ApiError::Validation(format!("Unknown badge: {tag}")))
}

fn unknown_category() -> ApiError {
    ApiError::Validation(String::from("Unknown category"))
}

fn duplicate_category() -> ApiError {
    ApiError::Conflict(String::from("Category already exists"))
}

async fn ensure_category_exists(state: &AppState, id: CategoryId) -> Result<(), ApiError> {
    if state.store.get_category(id).await?.is_none() {
        return Err(unknown_category());
    }
    Ok(())
}

/// Map a store write error, turning reference and uniqueness failures
/// into client errors.
fn write_error(err: StoreError, conflict: fn() -> ApiError) -> ApiError {
    match err {
        StoreError::MissingReference(_) => unknown_category(),
        StoreError::Conflict(_) => conflict(),
        other => other.into(),
    }
}

// ---------------------------------------------------------------------------
// Admin session
// ---------------------------------------------------------------------------

/// Body of `GET /api/admin/session`.
#[derive(Debug, Serialize)]
pub struct AdminSessionResponse {
    /// Whether this session passed the admin password check.
    pub verified: bool,
}

/// `POST /api/admin/verify-password` -- unlock the admin panel for this
/// session.
pub async fn verify_password(
    State(state): State<Arc<AppState>>,
    SiteAdmin { session, user }: SiteAdmin,
    ApiJson(req): ApiJson<VerifyPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(expected) = state.config.admin_password.as_deref() else {
        return Err(ApiError::Misconfigured(String::from(
            "Admin password not configured",
        )));
    };
    if !auth::admin_password_matches(expected, &req.password) {
        tracing::warn!(user_id = %user.id, "Admin password rejected");
        return Err(ApiError::Unauthenticated(String::from(
            "Invalid admin password",
        )));
    }

    auth::mark_admin_verified(&session).await?;
    tracing::info!(user_id = %user.id, "Admin session verified");
    Ok(Json(Success::OK))
}

/// `GET /api/admin/session`
pub async fn session_status(
    SiteAdmin { session, .. }: SiteAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let verified = auth::is_admin_verified(&session).await?;
    Ok(Json(AdminSessionResponse { verified }))
}

/// Body of `GET /api/admin/dashboard`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Every game.
    pub games: Vec<crave_types::Game>,
    /// Every category.
    pub categories: Vec<crave_types::Category>,
    /// Every store item.
    pub store_items: Vec<crave_types::StoreItem>,
}

/// `GET /api/admin/dashboard`
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(DashboardResponse {
        games: state.store.list_games().await?,
        categories: state.store.list_categories().await?,
        store_items: state.store.list_store_items().await?,
    }))
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// `POST /api/admin/games`
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(mut req): ApiJson<CreateGameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.name = trim(&req.name);
    req.thumbnail_url = trim(&req.thumbnail_url);
    validate_in_order(&req, &["name", "thumbnail_url"])?;
    let badge = req.badge.as_deref().map(parse_badge).transpose()?.flatten();
    ensure_category_exists(&state, req.category_id).await?;

    let game = state
        .store
        .create_game(NewGame {
            name: req.name,
            description: optional_text(req.description),
            instructions: optional_text(req.instructions),
            category_id: req.category_id,
            thumbnail_url: req.thumbnail_url,
            iframe_url: optional_text(req.iframe_url),
            html_content: optional_text(req.html_content),
            kind: req.kind,
            badge,
            trending: req.trending,
        })
        .await
        .map_err(|e| write_error(e, unknown_category))?;

    tracing::info!(game_id = %game.id, name = %game.name, "Game created");
    Ok(Json(game))
}

/// `PUT /api/admin/games/{id}`
pub async fn update_game(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id_str): ApiPath<String>,
    ApiJson(mut req): ApiJson<UpdateGameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = GameId::from(parse_uuid(&id_str)?);
    req.name = req.name.as_deref().map(trim);
    req.thumbnail_url = req.thumbnail_url.as_deref().map(trim);
    validate_in_order(&req, &["name", "thumbnail_url"])?;
    let badge = req.badge.as_deref().map(parse_badge).transpose()?;
    if let Some(category_id) = req.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let patch = GamePatch {
        name: req.name,
        description: patch_text(req.description),
        instructions: patch_text(req.instructions),
        category_id: req.category_id,
        thumbnail_url: req.thumbnail_url,
        iframe_url: patch_text(req.iframe_url),
        html_content: patch_text(req.html_content),
        kind: req.kind,
        badge,
        trending: req.trending,
    };
    let game = state
        .store
        .update_game(id, patch)
        .await
        .map_err(|e| write_error(e, unknown_category))?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;

    tracing::info!(game_id = %id, "Game updated");
    Ok(Json(game))
}

/// `DELETE /api/admin/games/{id}`
pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id_str): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = GameId::from(parse_uuid(&id_str)?);
    if !state.store.delete_game(id).await? {
        return Err(ApiError::not_found("Game not found"));
    }
    tracing::info!(game_id = %id, "Game deleted");
    Ok(Json(Success::OK))
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// `POST /api/admin/categories`
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(mut req): ApiJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.name = trim(&req.name);
    validate_in_order(&req, &["name"])?;

    let category = state
        .store
        .create_category(NewCategory {
            name: req.name,
            icon: optional_text(req.icon)
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_owned()),
        })
        .await
        .map_err(|e| write_error(e, duplicate_category))?;

    tracing::info!(category_id = %category.id, name = %category.name, "Category created");
    Ok(Json(category))
}

/// `PUT /api/admin/categories/{id}`
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id_str): ApiPath<String>,
    ApiJson(mut req): ApiJson<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = CategoryId::from(parse_uuid(&id_str)?);
    req.name = req.name.as_deref().map(trim);
    validate_in_order(&req, &["name"])?;

    let patch = CategoryPatch {
        name: req.name,
        icon: req.icon.map(|icon| {
            optional_text(Some(icon)).unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_owned())
        }),
    };
    let category = state
        .store
        .update_category(id, patch)
        .await
        .map_err(|e| write_error(e, duplicate_category))?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;

    tracing::info!(category_id = %id, "Category updated");
    Ok(Json(category))
}

/// `DELETE /api/admin/categories/{id}` -- refused while games use it.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id_str): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = CategoryId::from(parse_uuid(&id_str)?);
    match state.store.delete_category(id).await? {
        CategoryDeletion::Deleted => {
            tracing::info!(category_id = %id, "Category deleted");
            Ok(Json(Success::OK))
        }
        CategoryDeletion::NotFound => Err(ApiError::not_found("Category not found")),
        CategoryDeletion::InUse { games } => Err(ApiError::Conflict(format!(
            "Category is used by {games} game(s)"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Store items
// ---------------------------------------------------------------------------

fn duplicate_item() -> ApiError {
    ApiError::Conflict(String::from("Store item already exists"))
}

/// `POST /api/admin/store-items`
pub async fn create_store_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(mut req): ApiJson<CreateStoreItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.name = trim(&req.name);
    req.image_url = trim(&req.image_url);
    validate_in_order(&req, &["name", "image_url", "price"])?;

    let item = state
        .store
        .create_store_item(NewStoreItem {
            name: req.name,
            image_url: req.image_url,
            price: req.price,
            item_type: req.item_type,
        })
        .await
        .map_err(|e| write_error(e, duplicate_item))?;

    tracing::info!(item_id = %item.id, name = %item.name, price = item.price, "Store item created");
    Ok(Json(item))
}

/// `PUT /api/admin/store-items/{id}`
pub async fn update_store_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id_str): ApiPath<String>,
    ApiJson(mut req): ApiJson<UpdateStoreItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = StoreItemId::from(parse_uuid(&id_str)?);
    req.name = req.name.as_deref().map(trim);
    req.image_url = req.image_url.as_deref().map(trim);
    validate_in_order(&req, &["name", "image_url", "price"])?;

    let patch = StoreItemPatch {
        name: req.name,
        image_url: req.image_url,
        price: req.price,
        item_type: req.item_type,
    };
    let item = state
        .store
        .update_store_item(id, patch)
        .await
        .map_err(|e| write_error(e, duplicate_item))?
        .ok_or_else(|| ApiError::not_found("Store item not found"))?;

    tracing::info!(item_id = %id, "Store item updated");
    Ok(Json(item))
}

/// `DELETE /api/admin/store-items/{id}`
pub async fn delete_store_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id_str): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = StoreItemId::from(parse_uuid(&id_str)?);
    if !state.store.delete_store_item(id).await? {
        return Err(ApiError::not_found("Store item not found"));
    }
    tracing::info!(item_id = %id, "Store item deleted");
    Ok(Json(Success::OK))
}
