//! Row types and column translation for the `PostgreSQL` backend.
//!
//! This is the only place that knows the database spells the coin
//! balance `crave_coins`, the game kind `type` and the trending flag
//! `is_trending`, or that enum tags are stored as plain `TEXT`. Rows are
//! decoded with runtime types and converted into domain records here;
//! a value that cannot be converted is reported as
//! [`StoreError::Corrupt`] instead of being silently defaulted.

use chrono::{DateTime, Utc};
use crave_types::{
    Badge, Category, Comment, CommentWithUser, Game, GameType, ItemType, Rating, StoreItem, User,
};
use uuid::Uuid;

use crate::error::StoreError;

/// Constraint names from the initial migration.
///
/// The in-memory backend reports the same names so both backends raise
/// identical [`StoreError::Conflict`] / [`StoreError::MissingReference`]
/// values.
pub mod constraint {
    /// Unique username.
    pub const USERS_USERNAME: &str = "users_username_key";
    /// Case-insensitive unique category name.
    pub const CATEGORIES_NAME: &str = "categories_name_lower_idx";
    /// Game to category reference.
    pub const GAMES_CATEGORY_FK: &str = "games_category_id_fkey";
    /// Favorite to user reference.
    pub const FAVORITES_USER_FK: &str = "favorites_user_id_fkey";
    /// Rating to user reference.
    pub const RATINGS_USER_FK: &str = "ratings_user_id_fkey";
    /// Comment to user reference.
    pub const COMMENTS_USER_FK: &str = "comments_user_id_fkey";
}

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Columns selected for a [`UserRow`].
pub const USER_COLUMNS: &str =
    "users.id, users.username, users.password_hash, users.crave_coins, users.active_avatar_id, users.is_admin";

/// Columns selected for a [`CategoryRow`].
pub const CATEGORY_COLUMNS: &str = "categories.id, categories.name, categories.icon";

/// Columns selected for a [`GameRow`].
pub const GAME_COLUMNS: &str = "games.id, games.name, games.description, games.instructions, \
     games.category_id, games.thumbnail_url, games.iframe_url, games.html_content, games.type, \
     games.play_count, games.average_rating, games.rating_count, games.badge, games.is_trending";

/// Columns selected for a [`StoreItemRow`].
pub const STORE_ITEM_COLUMNS: &str =
    "store_items.id, store_items.name, store_items.image_url, store_items.price, store_items.item_type";

/// Turn free text into an `ILIKE` substring pattern, escaping the
/// pattern metacharacters so `50%` matches literally.
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len().saturating_add(2));
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// User UUID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// bcrypt hash.
    pub password_hash: String,
    /// Coin balance.
    pub crave_coins: i64,
    /// Selected avatar, if any.
    pub active_avatar_id: Option<Uuid>,
    /// Site admin flag.
    pub is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            username: row.username,
            password_hash: row.password_hash,
            coins: row.crave_coins,
            active_avatar_id: row.active_avatar_id.map(Into::into),
            is_admin: row.is_admin,
        }
    }
}

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    /// Category UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Icon identifier.
    pub icon: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            icon: row.icon,
        }
    }
}

/// A row from the `games` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameRow {
    /// Game UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: Option<String>,
    /// How to play.
    pub instructions: Option<String>,
    /// Owning category.
    pub category_id: Uuid,
    /// Card thumbnail URL.
    pub thumbnail_url: String,
    /// External content URL.
    pub iframe_url: Option<String>,
    /// Inline HTML document.
    pub html_content: Option<String>,
    /// Game type tag.
    #[sqlx(rename = "type")]
    pub game_type: String,
    /// Play counter.
    pub play_count: i64,
    /// Mean rating.
    pub average_rating: f64,
    /// Number of ratings.
    pub rating_count: i32,
    /// Badge tag.
    pub badge: Option<String>,
    /// Featured flag.
    pub is_trending: bool,
}

impl TryFrom<GameRow> for Game {
    type Error = StoreError;

    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        let kind = GameType::from_tag(&row.game_type).ok_or_else(|| {
            StoreError::Corrupt(format!("game {}: unknown type {:?}", row.id, row.game_type))
        })?;
        let badge = row
            .badge
            .as_deref()
            .map(|tag| {
                Badge::from_tag(tag).ok_or_else(|| {
                    StoreError::Corrupt(format!("game {}: unknown badge {tag:?}", row.id))
                })
            })
            .transpose()?;
        let play_count = u64::try_from(row.play_count)
            .map_err(|e| StoreError::Corrupt(format!("game {}: play count: {e}", row.id)))?;
        let rating_count = u32::try_from(row.rating_count)
            .map_err(|e| StoreError::Corrupt(format!("game {}: rating count: {e}", row.id)))?;

        Ok(Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            instructions: row.instructions,
            category_id: row.category_id.into(),
            thumbnail_url: row.thumbnail_url,
            iframe_url: row.iframe_url,
            html_content: row.html_content,
            kind,
            play_count,
            average_rating: row.average_rating,
            rating_count,
            badge,
            trending: row.is_trending,
        })
    }
}

/// Convert a batch of game rows, failing on the first corrupt one.
pub fn games_from_rows(rows: Vec<GameRow>) -> Result<Vec<Game>, StoreError> {
    rows.into_iter().map(Game::try_from).collect()
}

/// A row from the `ratings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingRow {
    /// Rating UUID.
    pub id: Uuid,
    /// Who rated.
    pub user_id: Uuid,
    /// Which game.
    pub game_id: Uuid,
    /// Rating value.
    pub rating: i16,
}

impl TryFrom<RatingRow> for Rating {
    type Error = StoreError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|e| {
            StoreError::Corrupt(format!("rating {}: value {}: {e}", row.id, row.rating))
        })?;
        Ok(Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            game_id: row.game_id.into(),
            rating,
        })
    }
}

/// A row from the `comments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    /// Comment UUID.
    pub id: Uuid,
    /// Author.
    pub user_id: Uuid,
    /// Game commented on.
    pub game_id: Uuid,
    /// Comment text.
    pub content: String,
    /// Posting time.
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            game_id: row.game_id.into(),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithUserRow {
    /// The comment columns.
    #[sqlx(flatten)]
    pub comment: CommentRow,
    /// Author username (`COALESCE`d to "Unknown").
    pub username: String,
}

impl From<CommentWithUserRow> for CommentWithUser {
    fn from(row: CommentWithUserRow) -> Self {
        Self {
            comment: row.comment.into(),
            username: row.username,
        }
    }
}

/// A row from the `store_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreItemRow {
    /// Item UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Preview image URL.
    pub image_url: String,
    /// Price in coins.
    pub price: i64,
    /// Item type tag.
    pub item_type: String,
}

impl TryFrom<StoreItemRow> for StoreItem {
    type Error = StoreError;

    fn try_from(row: StoreItemRow) -> Result<Self, Self::Error> {
        let item_type = ItemType::from_tag(&row.item_type).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "store item {}: unknown item type {:?}",
                row.id, row.item_type
            ))
        })?;
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            image_url: row.image_url,
            price: row.price,
            item_type,
        })
    }
}

/// Convert a batch of store item rows, failing on the first corrupt one.
pub fn store_items_from_rows(rows: Vec<StoreItemRow>) -> Result<Vec<StoreItem>, StoreError> {
    rows.into_iter().map(StoreItem::try_from).collect()
}
