//! The [`Storage`] capability trait shared by every backend.
//!
//! The API layer only ever sees `Arc<dyn Storage>`. Two implementations
//! exist: [`MemoryStore`](crate::MemoryStore) for development and tests,
//! and [`PostgresStore`](crate::PostgresStore) for production. Both must
//! produce identical results for identical call sequences; the shared
//! suite in `tests/storage_contract.rs` holds them to that.
//!
//! # Atomicity
//!
//! Operations that read then write (purchase, rating submission,
//! favorite toggle, avatar selection, coin credit, category deletion)
//! are single trait calls so each backend can make them atomic: one
//! write guard in memory, one transaction or conditional statement in
//! `PostgreSQL`.
//!
//! # Ordering
//!
//! | Listing | Order |
//! |---------|-------|
//! | categories, games, trending games, search | name, then id |
//! | store items | price ascending, then name |
//! | comments | newest first |
//! | favorites, inventory | insertion order |

use async_trait::async_trait;
use crave_economy::{EconomyError, RatingValue};
use crave_types::{
    Category, CategoryId, CategoryPatch, Comment, CommentWithUser, Game, GameId, GamePatch,
    NewCategory, NewGame, NewStoreItem, NewUser, Rating, RatingSummary, StoreItem, StoreItemId,
    StoreItemPatch, User, UserId,
};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Outcomes of compound operations
// ---------------------------------------------------------------------------

/// Result of [`Storage::purchase_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Coins were debited and the item granted.
    Purchased {
        /// Balance after the debit.
        new_balance: i64,
    },
    /// The purchase broke an economy rule; nothing changed.
    Rejected(EconomyError),
    /// No store item with that id.
    ItemNotFound,
    /// No user with that id.
    UserNotFound,
}

/// Result of [`Storage::set_active_avatar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarOutcome {
    /// The avatar was selected.
    Selected,
    /// The user does not own the item; nothing changed.
    NotOwned,
    /// No user with that id.
    UserNotFound,
}

/// Result of [`Storage::delete_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDeletion {
    /// The category was removed.
    Deleted,
    /// No category with that id.
    NotFound,
    /// Games still reference the category; nothing changed.
    InUse {
        /// Number of referencing games.
        games: u64,
    },
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Uniform data access over every portal entity.
///
/// Reads return `Ok(None)` / `Ok(vec![])` for absent records. Writes that
/// target a missing parent return `Ok(None)` where the signature allows,
/// so the caller can answer 404 without a second round trip.
#[async_trait]
pub trait Storage: Send + Sync {
    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user by exact (case-sensitive) username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Create a user with the starting coin balance.
    ///
    /// Returns [`StoreError::Conflict`] if the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Set or clear the site-admin flag. Returns `false` if the user is unknown.
    async fn set_user_admin(&self, id: UserId, is_admin: bool) -> Result<bool, StoreError>;

    /// Atomically add `amount` coins. Returns the new balance, or `None`
    /// if the user is unknown.
    async fn credit_coins(&self, id: UserId, amount: i64) -> Result<Option<i64>, StoreError>;

    /// Select an owned store item as the user's avatar.
    async fn set_active_avatar(
        &self,
        user_id: UserId,
        item_id: StoreItemId,
    ) -> Result<AvatarOutcome, StoreError>;

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Fetch a category by id.
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    /// Fetch a category by name, ignoring case.
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError>;

    /// Create a category. Returns [`StoreError::Conflict`] on a duplicate name.
    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError>;

    /// Apply a partial update. Returns `None` if the category is unknown.
    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, StoreError>;

    /// Delete a category unless games still reference it.
    async fn delete_category(&self, id: CategoryId) -> Result<CategoryDeletion, StoreError>;

    // =========================================================================
    // Games
    // =========================================================================

    /// List every game.
    async fn list_games(&self) -> Result<Vec<Game>, StoreError>;

    /// Case-insensitive substring search over game name and description.
    async fn search_games(&self, query: &str) -> Result<Vec<Game>, StoreError>;

    /// Fetch a game by id.
    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StoreError>;

    /// List the games of one category.
    async fn list_games_by_category(&self, id: CategoryId) -> Result<Vec<Game>, StoreError>;

    /// List games flagged as trending.
    async fn list_trending_games(&self) -> Result<Vec<Game>, StoreError>;

    /// Atomically bump the play count and return the updated game.
    async fn increment_play_count(&self, id: GameId) -> Result<Option<Game>, StoreError>;

    /// Create a game with zero plays and no ratings.
    ///
    /// Returns [`StoreError::MissingReference`] if the category is unknown.
    async fn create_game(&self, game: NewGame) -> Result<Game, StoreError>;

    /// Apply a partial update. Returns `None` if the game is unknown.
    async fn update_game(&self, id: GameId, patch: GamePatch) -> Result<Option<Game>, StoreError>;

    /// Delete a game with its favorites, ratings and comments.
    /// Returns `false` if the game is unknown.
    async fn delete_game(&self, id: GameId) -> Result<bool, StoreError>;

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Whether the user has favorited the game.
    async fn is_favorite(&self, user_id: UserId, game_id: GameId) -> Result<bool, StoreError>;

    /// Flip the favorite flag and return the new state, or `None` if the
    /// game is unknown.
    async fn toggle_favorite(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> Result<Option<bool>, StoreError>;

    /// The user's favorite games.
    async fn list_favorite_games(&self, user_id: UserId) -> Result<Vec<Game>, StoreError>;

    // =========================================================================
    // Ratings
    // =========================================================================

    /// The user's rating of a game, if any.
    async fn get_rating(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> Result<Option<Rating>, StoreError>;

    /// Every rating of a game.
    async fn list_ratings_for_game(&self, game_id: GameId) -> Result<Vec<Rating>, StoreError>;

    /// Upsert the user's rating and recompute the game aggregate in one
    /// atomic step. Returns `None` if the game is unknown.
    async fn submit_rating(
        &self,
        user_id: UserId,
        game_id: GameId,
        value: RatingValue,
    ) -> Result<Option<RatingSummary>, StoreError>;

    // =========================================================================
    // Comments
    // =========================================================================

    /// Comments on a game, newest first, with author usernames.
    async fn list_comments(&self, game_id: GameId) -> Result<Vec<CommentWithUser>, StoreError>;

    /// Append a comment. Returns `None` if the game is unknown.
    async fn add_comment(
        &self,
        user_id: UserId,
        game_id: GameId,
        content: String,
    ) -> Result<Option<Comment>, StoreError>;

    // =========================================================================
    // Store items
    // =========================================================================

    /// List all store items.
    async fn list_store_items(&self) -> Result<Vec<StoreItem>, StoreError>;

    /// Fetch a store item by id.
    async fn get_store_item(&self, id: StoreItemId) -> Result<Option<StoreItem>, StoreError>;

    /// Create a store item.
    async fn create_store_item(&self, item: NewStoreItem) -> Result<StoreItem, StoreError>;

    /// Apply a partial update. Returns `None` if the item is unknown.
    async fn update_store_item(
        &self,
        id: StoreItemId,
        patch: StoreItemPatch,
    ) -> Result<Option<StoreItem>, StoreError>;

    /// Delete a store item, its ownership records, and any avatar
    /// selections pointing at it. Returns `false` if the item is unknown.
    async fn delete_store_item(&self, id: StoreItemId) -> Result<bool, StoreError>;

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Store items the user owns, in purchase order.
    async fn list_inventory(&self, user_id: UserId) -> Result<Vec<StoreItem>, StoreError>;

    /// Ids of the store items the user owns, in purchase order.
    async fn list_owned_item_ids(&self, user_id: UserId) -> Result<Vec<StoreItemId>, StoreError>;

    /// Whether the user owns the item.
    async fn owns_item(&self, user_id: UserId, item_id: StoreItemId) -> Result<bool, StoreError>;

    /// Validate and apply a purchase as one atomic debit + grant.
    ///
    /// Checks run in order: item exists, not already owned, balance
    /// covers the price.
    async fn purchase_item(
        &self,
        user_id: UserId,
        item_id: StoreItemId,
    ) -> Result<PurchaseOutcome, StoreError>;
}
