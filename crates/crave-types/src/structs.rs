//! Core entity structs for the portal.
//!
//! Entities are flat records: relations are expressed by id, never by
//! nesting. Field names are `snake_case` in Rust and `camelCase` on the
//! wire; where the wire name differs from the Rust name (`craveCoins`,
//! `type`, `isTrending`) the rename is explicit.
//!
//! The `New*` structs carry the fields a caller supplies on creation;
//! the `*Patch` structs describe partial updates where `None` means
//! "keep the current value". Nullable columns use `Option<Option<T>>`
//! so a patch can distinguish "keep" from "clear".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Badge, GameType, ItemType};
use crate::ids::{
    CategoryId, CommentId, FavoriteId, GameId, InventoryEntryId, RatingId, StoreItemId, UserId,
};

/// Coin balance every account starts with.
pub const STARTING_COINS: i64 = 100;

/// Icon used when a category is created without one.
pub const DEFAULT_CATEGORY_ICON: &str = "gamepad-2";

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A registered portal account.
///
/// The credential hash is never serialized; handlers can return a
/// `User` directly without leaking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Login name, unique across the portal.
    pub username: String,
    /// bcrypt hash of the password.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    /// Crave Coins balance.
    #[serde(rename = "craveCoins")]
    pub coins: i64,
    /// Store item currently used as the profile avatar.
    pub active_avatar_id: Option<StoreItemId>,
    /// Site administrator flag (first half of the admin gate).
    pub is_admin: bool,
}

/// Fields required to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Already-hashed password.
    pub password_hash: String,
    /// Whether the account starts as a site administrator.
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A game category shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Display name, unique (case-insensitive).
    pub name: String,
    /// Lucide icon identifier.
    pub icon: String,
}

/// Fields required to create a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// Lucide icon identifier.
    pub icon: String,
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    /// New display name.
    pub name: Option<String>,
    /// New icon identifier.
    pub icon: Option<String>,
}

impl CategoryPatch {
    /// Apply this patch to a category in place.
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name.clone_from(name);
        }
        if let Some(icon) = &self.icon {
            category.icon.clone_from(icon);
        }
    }
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// A playable game in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Game {
    /// Unique game identifier.
    pub id: GameId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: Option<String>,
    /// How to play.
    pub instructions: Option<String>,
    /// Owning category.
    pub category_id: CategoryId,
    /// Card thumbnail URL.
    pub thumbnail_url: String,
    /// External content URL (iframe and flash games).
    pub iframe_url: Option<String>,
    /// Inline HTML document (uploaded and embed games).
    pub html_content: Option<String>,
    /// Content delivery variant.
    #[serde(rename = "type")]
    pub kind: GameType,
    /// Number of times the detail page was opened.
    #[ts(type = "number")]
    pub play_count: u64,
    /// Mean of all current ratings, `0.0` when unrated.
    pub average_rating: f64,
    /// Number of ratings contributing to the average.
    pub rating_count: u32,
    /// Optional cosmetic badge.
    pub badge: Option<Badge>,
    /// Admin-set featured flag.
    #[serde(rename = "isTrending")]
    pub trending: bool,
}

/// Fields required to create a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: Option<String>,
    /// How to play.
    pub instructions: Option<String>,
    /// Owning category.
    pub category_id: CategoryId,
    /// Card thumbnail URL.
    pub thumbnail_url: String,
    /// External content URL.
    pub iframe_url: Option<String>,
    /// Inline HTML document.
    pub html_content: Option<String>,
    /// Content delivery variant.
    pub kind: GameType,
    /// Optional cosmetic badge.
    pub badge: Option<Badge>,
    /// Featured flag.
    pub trending: bool,
}

/// Partial update of a game.
///
/// Play count and rating aggregates are not patchable; they only change
/// through play and rate events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePatch {
    /// New display name.
    pub name: Option<String>,
    /// New description (`Some(None)` clears).
    pub description: Option<Option<String>>,
    /// New instructions (`Some(None)` clears).
    pub instructions: Option<Option<String>>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New thumbnail URL.
    pub thumbnail_url: Option<String>,
    /// New content URL (`Some(None)` clears).
    pub iframe_url: Option<Option<String>>,
    /// New inline document (`Some(None)` clears).
    pub html_content: Option<Option<String>>,
    /// New delivery variant.
    pub kind: Option<GameType>,
    /// New badge (`Some(None)` clears).
    pub badge: Option<Option<Badge>>,
    /// New featured flag.
    pub trending: Option<bool>,
}

impl GamePatch {
    /// Apply this patch to a game in place.
    pub fn apply_to(&self, game: &mut Game) {
        if let Some(name) = &self.name {
            game.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            game.description.clone_from(description);
        }
        if let Some(instructions) = &self.instructions {
            game.instructions.clone_from(instructions);
        }
        if let Some(category_id) = self.category_id {
            game.category_id = category_id;
        }
        if let Some(thumbnail_url) = &self.thumbnail_url {
            game.thumbnail_url.clone_from(thumbnail_url);
        }
        if let Some(iframe_url) = &self.iframe_url {
            game.iframe_url.clone_from(iframe_url);
        }
        if let Some(html_content) = &self.html_content {
            game.html_content.clone_from(html_content);
        }
        if let Some(kind) = self.kind {
            game.kind = kind;
        }
        if let Some(badge) = self.badge {
            game.badge = badge;
        }
        if let Some(trending) = self.trending {
            game.trending = trending;
        }
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// A user's favorite game. Presence-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Favorite {
    /// Record identifier.
    pub id: FavoriteId,
    /// Who favorited.
    pub user_id: UserId,
    /// Which game.
    pub game_id: GameId,
}

/// A user's 1-5 rating of a game. One per (user, game).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Rating {
    /// Record identifier.
    pub id: RatingId,
    /// Who rated.
    pub user_id: UserId,
    /// Which game.
    pub game_id: GameId,
    /// Rating value in `1..=5`.
    pub rating: u8,
}

/// Aggregate rating of a game after a rating change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RatingSummary {
    /// Arithmetic mean of all ratings.
    pub average_rating: f64,
    /// Number of ratings.
    pub rating_count: u32,
}

/// A comment on a game. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Comment {
    /// Record identifier.
    pub id: CommentId,
    /// Author.
    pub user_id: UserId,
    /// Game commented on.
    pub game_id: GameId,
    /// Trimmed comment text.
    pub content: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CommentWithUser {
    /// The comment itself.
    #[serde(flatten)]
    pub comment: Comment,
    /// Author's username, `"Unknown"` if the account is gone.
    pub username: String,
}

/// Username shown for comments whose author no longer resolves.
pub const UNKNOWN_USERNAME: &str = "Unknown";

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A cosmetic sold for Crave Coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StoreItem {
    /// Unique item identifier.
    pub id: StoreItemId,
    /// Display name.
    pub name: String,
    /// Preview image URL.
    pub image_url: String,
    /// Price in coins (never negative).
    pub price: i64,
    /// Kind of cosmetic.
    pub item_type: ItemType,
}

/// Fields required to create a store item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoreItem {
    /// Display name.
    pub name: String,
    /// Preview image URL.
    pub image_url: String,
    /// Price in coins.
    pub price: i64,
    /// Kind of cosmetic.
    pub item_type: ItemType,
}

/// Partial update of a store item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreItemPatch {
    /// New display name.
    pub name: Option<String>,
    /// New preview image URL.
    pub image_url: Option<String>,
    /// New price.
    pub price: Option<i64>,
    /// New kind.
    pub item_type: Option<ItemType>,
}

impl StoreItemPatch {
    /// Apply this patch to a store item in place.
    pub fn apply_to(&self, item: &mut StoreItem) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(image_url) = &self.image_url {
            item.image_url.clone_from(image_url);
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(item_type) = self.item_type {
            item.item_type = item_type;
        }
    }
}

/// Ownership of a store item. Created once on purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct InventoryEntry {
    /// Record identifier.
    pub id: InventoryEntryId,
    /// Owner.
    pub user_id: UserId,
    /// Owned item.
    pub item_id: StoreItemId,
}
