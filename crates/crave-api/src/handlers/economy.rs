//! Crave Coins: the avatar store, inventory, avatar selection and the
//! click reward.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use crave_store::{AvatarOutcome, PurchaseOutcome};
use crave_types::{StoreItem, StoreItemId};
use serde::Serialize;

use super::{ApiPath, Success, parse_uuid};
use crate::auth::{AuthUser, MaybeUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `GET /api/store`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    /// Every store item.
    pub items: Vec<StoreItem>,
    /// Items the viewer owns; empty when anonymous.
    pub owned_item_ids: Vec<StoreItemId>,
}

/// Body of `POST /api/store/buy/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    /// Always `true`.
    pub success: bool,
    /// Balance after the debit.
    pub new_balance: i64,
}

/// Body of `GET /api/inventory`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    /// Owned items, in purchase order.
    pub items: Vec<StoreItem>,
    /// The selected avatar, if any.
    pub active_avatar_id: Option<StoreItemId>,
}

/// Body of `POST /api/coins/click`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickResponse {
    /// Always `true`.
    pub success: bool,
    /// Coins granted by this click.
    pub coins_earned: i64,
    /// Balance after the credit.
    pub new_balance: i64,
}

/// `GET /api/store`
pub async fn store(
    State(state): State<Arc<AppState>>,
    MaybeUser { user, .. }: MaybeUser,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.store.list_store_items().await?;
    let owned_item_ids = match &user {
        Some(user) => state.store.list_owned_item_ids(user.id).await?,
        None => Vec::new(),
    };
    Ok(Json(StoreResponse {
        items,
        owned_item_ids,
    }))
}

/// `POST /api/store/buy/{id}`
pub async fn buy(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    ApiPath(id_str): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id = StoreItemId::from(parse_uuid(&id_str)?);
    match state.store.purchase_item(user.id, item_id).await? {
        PurchaseOutcome::Purchased { new_balance } => {
            tracing::info!(user_id = %user.id, %item_id, new_balance, "Store item purchased");
            Ok(Json(PurchaseResponse {
                success: true,
                new_balance,
            }))
        }
        PurchaseOutcome::Rejected(reason) => Err(reason.into()),
        PurchaseOutcome::ItemNotFound => Err(ApiError::not_found("Store item not found")),
        PurchaseOutcome::UserNotFound => Err(ApiError::not_authenticated()),
    }
}

/// `GET /api/inventory`
pub async fn inventory(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(InventoryResponse {
        items: state.store.list_inventory(user.id).await?,
        active_avatar_id: user.active_avatar_id,
    }))
}

/// `POST /api/inventory/set-avatar/{id}`
pub async fn set_avatar(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    ApiPath(id_str): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id = StoreItemId::from(parse_uuid(&id_str)?);
    match state.store.set_active_avatar(user.id, item_id).await? {
        AvatarOutcome::Selected => Ok(Json(Success::OK)),
        AvatarOutcome::NotOwned => Err(ApiError::Validation(String::from("Item not owned"))),
        AvatarOutcome::UserNotFound => Err(ApiError::not_authenticated()),
    }
}

/// `POST /api/coins/click` -- grant a small random reward.
///
/// With a configured cooldown, a user's clicks arriving sooner than the
/// cooldown after their previous accepted one are refused with 429,
/// whichever session they come from.
pub async fn click(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let cooldown_ms = i64::try_from(state.config.click_cooldown.as_millis()).unwrap_or(i64::MAX);
    if !state.clicks.try_click(user.id, now_ms, cooldown_ms).await {
        return Err(ApiError::RateLimited(String::from("Clicking too fast")));
    }

    let coins_earned = crave_economy::roll_click_reward(&mut rand::rng());
    let new_balance = state
        .store
        .credit_coins(user.id, coins_earned)
        .await?
        .ok_or_else(ApiError::not_authenticated)?;

    Ok(Json(ClickResponse {
        success: true,
        coins_earned,
        new_balance,
    }))
}
