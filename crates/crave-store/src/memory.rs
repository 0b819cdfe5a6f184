//! In-process storage backend.
//!
//! All tables live in ordered maps behind one [`tokio::sync::RwLock`].
//! Reads share the lock; every mutation, including the compound ones
//! (purchase, rating, toggle), runs under a single write guard, so no
//! other request can observe or interleave with a half-applied change.
//!
//! Ids are UUID v7, so iterating a map in key order is insertion order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use crave_economy::{RatingValue, credit, evaluate_purchase, summarize};
use crave_types::{
    Category, CategoryId, CategoryPatch, Comment, CommentId, CommentWithUser, Favorite,
    FavoriteId, Game, GameId, GamePatch, InventoryEntry, InventoryEntryId, NewCategory, NewGame,
    NewStoreItem, NewUser, Rating, RatingId, RatingSummary, STARTING_COINS, StoreItem,
    StoreItemId, StoreItemPatch, UNKNOWN_USERNAME, User, UserId,
};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::rows::constraint;
use crate::storage::{AvatarOutcome, CategoryDeletion, PurchaseOutcome, Storage};

/// Every table of the portal.
#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    categories: BTreeMap<CategoryId, Category>,
    games: BTreeMap<GameId, Game>,
    favorites: BTreeMap<FavoriteId, Favorite>,
    ratings: BTreeMap<RatingId, Rating>,
    comments: BTreeMap<CommentId, Comment>,
    store_items: BTreeMap<StoreItemId, StoreItem>,
    inventory: BTreeMap<InventoryEntryId, InventoryEntry>,
}

impl Tables {
    fn require_user(&self, id: UserId, fk: &str) -> Result<(), StoreError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference(fk.to_owned()))
        }
    }

    fn require_category(&self, id: CategoryId) -> Result<(), StoreError> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference(
                constraint::GAMES_CATEGORY_FK.to_owned(),
            ))
        }
    }

    fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> bool {
        let wanted = name.to_lowercase();
        self.categories
            .values()
            .any(|c| Some(c.id) != except && c.name.to_lowercase() == wanted)
    }

    fn games_where(&self, keep: impl Fn(&Game) -> bool) -> Vec<Game> {
        let mut games: Vec<Game> = self.games.values().filter(|g| keep(g)).cloned().collect();
        sort_by_name(&mut games);
        games
    }

    fn owns(&self, user_id: UserId, item_id: StoreItemId) -> bool {
        self.inventory
            .values()
            .any(|e| e.user_id == user_id && e.item_id == item_id)
    }

    fn owned_item_ids(&self, user_id: UserId) -> Vec<StoreItemId> {
        self.inventory
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.item_id)
            .collect()
    }
}

fn sort_by_name(games: &mut [Game]) {
    games.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Map-backed [`Storage`] for development, seed data and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    // =========================================================================
    // Users
    // =========================================================================

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(constraint::USERS_USERNAME.to_owned()));
        }
        let created = User {
            id: UserId::new(),
            username: user.username,
            password_hash: user.password_hash,
            coins: STARTING_COINS,
            active_avatar_id: None,
            is_admin: user.is_admin,
        };
        tables.users.insert(created.id, created.clone());
        tracing::debug!(user_id = %created.id, "user created");
        Ok(created)
    }

    async fn set_user_admin(&self, id: UserId, is_admin: bool) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        user.is_admin = is_admin;
        Ok(true)
    }

    async fn credit_coins(&self, id: UserId, amount: i64) -> Result<Option<i64>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.coins = credit(user.coins, amount)?;
        Ok(Some(user.coins))
    }

    async fn set_active_avatar(
        &self,
        user_id: UserId,
        item_id: StoreItemId,
    ) -> Result<AvatarOutcome, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Ok(AvatarOutcome::UserNotFound);
        }
        if !tables.owns(user_id, item_id) {
            return Ok(AvatarOutcome::NotOwned);
        }
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.active_avatar_id = Some(item_id);
        }
        Ok(AvatarOutcome::Selected)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let wanted = name.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.name.to_lowercase() == wanted)
            .cloned())
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.category_name_taken(&category.name, None) {
            return Err(StoreError::Conflict(constraint::CATEGORIES_NAME.to_owned()));
        }
        let created = Category {
            id: CategoryId::new(),
            name: category.name,
            icon: category.icon,
        };
        tables.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, StoreError> {
        let mut tables = self.tables.write().await;
        let renamed_onto_other = patch
            .name
            .as_deref()
            .is_some_and(|name| tables.category_name_taken(name, Some(id)));
        if renamed_onto_other {
            return Err(StoreError::Conflict(constraint::CATEGORIES_NAME.to_owned()));
        }
        Ok(tables.categories.get_mut(&id).map(|category| {
            patch.apply_to(category);
            category.clone()
        }))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<CategoryDeletion, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&id) {
            return Ok(CategoryDeletion::NotFound);
        }
        let games = tables.games.values().filter(|g| g.category_id == id).count();
        if games > 0 {
            return Ok(CategoryDeletion::InUse {
                games: u64::try_from(games).unwrap_or(u64::MAX),
            });
        }
        tables.categories.remove(&id);
        Ok(CategoryDeletion::Deleted)
    }

    // =========================================================================
    // Games
    // =========================================================================

    async fn list_games(&self) -> Result<Vec<Game>, StoreError> {
        Ok(self.tables.read().await.games_where(|_| true))
    }

    async fn search_games(&self, query: &str) -> Result<Vec<Game>, StoreError> {
        let needle = query.to_lowercase();
        Ok(self.tables.read().await.games_where(|g| {
            g.name.to_lowercase().contains(&needle)
                || g
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        }))
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        Ok(self.tables.read().await.games.get(&id).cloned())
    }

    async fn list_games_by_category(&self, id: CategoryId) -> Result<Vec<Game>, StoreError> {
        Ok(self.tables.read().await.games_where(|g| g.category_id == id))
    }

    async fn list_trending_games(&self) -> Result<Vec<Game>, StoreError> {
        Ok(self.tables.read().await.games_where(|g| g.trending))
    }

    async fn increment_play_count(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.games.get_mut(&id).map(|game| {
            game.play_count = game.play_count.saturating_add(1);
            game.clone()
        }))
    }

    async fn create_game(&self, game: NewGame) -> Result<Game, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_category(game.category_id)?;
        let created = Game {
            id: GameId::new(),
            name: game.name,
            description: game.description,
            instructions: game.instructions,
            category_id: game.category_id,
            thumbnail_url: game.thumbnail_url,
            iframe_url: game.iframe_url,
            html_content: game.html_content,
            kind: game.kind,
            play_count: 0,
            average_rating: 0.0,
            rating_count: 0,
            badge: game.badge,
            trending: game.trending,
        };
        tables.games.insert(created.id, created.clone());
        tracing::debug!(game_id = %created.id, name = %created.name, "game created");
        Ok(created)
    }

    async fn update_game(&self, id: GameId, patch: GamePatch) -> Result<Option<Game>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.games.contains_key(&id) {
            return Ok(None);
        }
        if let Some(category_id) = patch.category_id {
            tables.require_category(category_id)?;
        }
        Ok(tables.games.get_mut(&id).map(|game| {
            patch.apply_to(game);
            game.clone()
        }))
    }

    async fn delete_game(&self, id: GameId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.games.remove(&id).is_none() {
            return Ok(false);
        }
        tables.favorites.retain(|_, f| f.game_id != id);
        tables.ratings.retain(|_, r| r.game_id != id);
        tables.comments.retain(|_, c| c.game_id != id);
        tracing::debug!(game_id = %id, "game deleted with its interactions");
        Ok(true)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    async fn is_favorite(&self, user_id: UserId, game_id: GameId) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .favorites
            .values()
            .any(|f| f.user_id == user_id && f.game_id == game_id))
    }

    async fn toggle_favorite(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> Result<Option<bool>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.games.contains_key(&game_id) {
            return Ok(None);
        }
        tables.require_user(user_id, constraint::FAVORITES_USER_FK)?;

        let existing = tables
            .favorites
            .values()
            .find(|f| f.user_id == user_id && f.game_id == game_id)
            .map(|f| f.id);
        if let Some(id) = existing {
            tables.favorites.remove(&id);
            return Ok(Some(false));
        }
        let favorite = Favorite {
            id: FavoriteId::new(),
            user_id,
            game_id,
        };
        tables.favorites.insert(favorite.id, favorite);
        Ok(Some(true))
    }

    async fn list_favorite_games(&self, user_id: UserId) -> Result<Vec<Game>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| tables.games.get(&f.game_id).cloned())
            .collect())
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    async fn get_rating(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> Result<Option<Rating>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .values()
            .find(|r| r.user_id == user_id && r.game_id == game_id)
            .cloned())
    }

    async fn list_ratings_for_game(&self, game_id: GameId) -> Result<Vec<Rating>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .values()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn submit_rating(
        &self,
        user_id: UserId,
        game_id: GameId,
        value: RatingValue,
    ) -> Result<Option<RatingSummary>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.games.contains_key(&game_id) {
            return Ok(None);
        }
        tables.require_user(user_id, constraint::RATINGS_USER_FK)?;

        let existing = tables
            .ratings
            .values()
            .find(|r| r.user_id == user_id && r.game_id == game_id)
            .map(|r| r.id);
        if let Some(rating) = existing.and_then(|id| tables.ratings.get_mut(&id)) {
            rating.rating = value.get();
        } else {
            let rating = Rating {
                id: RatingId::new(),
                user_id,
                game_id,
                rating: value.get(),
            };
            tables.ratings.insert(rating.id, rating);
        }

        let summary = summarize(
            tables
                .ratings
                .values()
                .filter(|r| r.game_id == game_id)
                .map(|r| r.rating),
        );
        if let Some(game) = tables.games.get_mut(&game_id) {
            game.average_rating = summary.average_rating;
            game.rating_count = summary.rating_count;
        }
        tracing::debug!(
            game_id = %game_id,
            average = summary.average_rating,
            count = summary.rating_count,
            "rating recorded"
        );
        Ok(Some(summary))
    }

    // =========================================================================
    // Comments
    // =========================================================================

    async fn list_comments(&self, game_id: GameId) -> Result<Vec<CommentWithUser>, StoreError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<CommentWithUser> = tables
            .comments
            .values()
            .filter(|c| c.game_id == game_id)
            .map(|c| CommentWithUser {
                comment: c.clone(),
                username: tables
                    .users
                    .get(&c.user_id)
                    .map_or_else(|| UNKNOWN_USERNAME.to_owned(), |u| u.username.clone()),
            })
            .collect();
        comments.sort_by(|a, b| {
            b.comment
                .created_at
                .cmp(&a.comment.created_at)
                .then_with(|| b.comment.id.cmp(&a.comment.id))
        });
        Ok(comments)
    }

    async fn add_comment(
        &self,
        user_id: UserId,
        game_id: GameId,
        content: String,
    ) -> Result<Option<Comment>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.games.contains_key(&game_id) {
            return Ok(None);
        }
        tables.require_user(user_id, constraint::COMMENTS_USER_FK)?;
        let comment = Comment {
            id: CommentId::new(),
            user_id,
            game_id,
            content,
            // PostgreSQL keeps microseconds; match it.
            created_at: Utc::now().trunc_subsecs(6),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(Some(comment))
    }

    // =========================================================================
    // Store items
    // =========================================================================

    async fn list_store_items(&self) -> Result<Vec<StoreItem>, StoreError> {
        let tables = self.tables.read().await;
        let mut items: Vec<StoreItem> = tables.store_items.values().cloned().collect();
        items.sort_by(|a, b| {
            a.price
                .cmp(&b.price)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    async fn get_store_item(&self, id: StoreItemId) -> Result<Option<StoreItem>, StoreError> {
        Ok(self.tables.read().await.store_items.get(&id).cloned())
    }

    async fn create_store_item(&self, item: NewStoreItem) -> Result<StoreItem, StoreError> {
        let created = StoreItem {
            id: StoreItemId::new(),
            name: item.name,
            image_url: item.image_url,
            price: item.price,
            item_type: item.item_type,
        };
        self.tables
            .write()
            .await
            .store_items
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_store_item(
        &self,
        id: StoreItemId,
        patch: StoreItemPatch,
    ) -> Result<Option<StoreItem>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.store_items.get_mut(&id).map(|item| {
            patch.apply_to(item);
            item.clone()
        }))
    }

    async fn delete_store_item(&self, id: StoreItemId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.store_items.remove(&id).is_none() {
            return Ok(false);
        }
        tables.inventory.retain(|_, e| e.item_id != id);
        for user in tables.users.values_mut() {
            if user.active_avatar_id == Some(id) {
                user.active_avatar_id = None;
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    async fn list_inventory(&self, user_id: UserId) -> Result<Vec<StoreItem>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .owned_item_ids(user_id)
            .into_iter()
            .filter_map(|id| tables.store_items.get(&id).cloned())
            .collect())
    }

    async fn list_owned_item_ids(&self, user_id: UserId) -> Result<Vec<StoreItemId>, StoreError> {
        Ok(self.tables.read().await.owned_item_ids(user_id))
    }

    async fn owns_item(&self, user_id: UserId, item_id: StoreItemId) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.owns(user_id, item_id))
    }

    async fn purchase_item(
        &self,
        user_id: UserId,
        item_id: StoreItemId,
    ) -> Result<PurchaseOutcome, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(balance) = tables.users.get(&user_id).map(|u| u.coins) else {
            return Ok(PurchaseOutcome::UserNotFound);
        };
        let Some(price) = tables.store_items.get(&item_id).map(|i| i.price) else {
            return Ok(PurchaseOutcome::ItemNotFound);
        };

        let new_balance = match evaluate_purchase(balance, price, tables.owns(user_id, item_id)) {
            Ok(new_balance) => new_balance,
            Err(rejection) => return Ok(PurchaseOutcome::Rejected(rejection)),
        };

        if let Some(user) = tables.users.get_mut(&user_id) {
            user.coins = new_balance;
        }
        let entry = InventoryEntry {
            id: InventoryEntryId::new(),
            user_id,
            item_id,
        };
        tables.inventory.insert(entry.id, entry);
        tracing::debug!(user_id = %user_id, item_id = %item_id, price, new_balance, "item purchased");
        Ok(PurchaseOutcome::Purchased { new_balance })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use crave_types::{GameType, ItemType};

    use super::*;

    async fn store_with_game() -> (MemoryStore, UserId, GameId) {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                username: "player1".to_owned(),
                password_hash: "hash".to_owned(),
                is_admin: false,
            })
            .await;
        let category = store
            .create_category(NewCategory {
                name: "Action".to_owned(),
                icon: "sword".to_owned(),
            })
            .await;
        let (Ok(user), Ok(category)) = (user, category) else {
            panic!("fixture setup failed");
        };
        let game = store
            .create_game(NewGame {
                name: "Space Shooter".to_owned(),
                description: None,
                instructions: None,
                category_id: category.id,
                thumbnail_url: "https://img/space.png".to_owned(),
                iframe_url: None,
                html_content: None,
                kind: GameType::Iframe,
                badge: None,
                trending: false,
            })
            .await;
        let Ok(game) = game else {
            panic!("fixture setup failed");
        };
        (store, user.id, game.id)
    }

    #[tokio::test]
    async fn deleting_a_game_removes_its_interactions() {
        let (store, user, game) = store_with_game().await;
        let rating = RatingValue::new(4).ok();
        assert!(store.toggle_favorite(user, game).await.is_ok());
        if let Some(rating) = rating {
            assert!(store.submit_rating(user, game, rating).await.is_ok());
        }
        assert!(store.add_comment(user, game, "gg".to_owned()).await.is_ok());

        assert_eq!(store.delete_game(game).await.ok(), Some(true));

        let tables = store.tables.read().await;
        assert!(tables.favorites.is_empty());
        assert!(tables.ratings.is_empty());
        assert!(tables.comments.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_store_item_clears_owned_avatar() {
        let (store, user, _) = store_with_game().await;
        let item = store
            .create_store_item(NewStoreItem {
                name: "Cool Cat".to_owned(),
                image_url: "https://img/cat.svg".to_owned(),
                price: 50,
                item_type: ItemType::Avatar,
            })
            .await;
        let Ok(item) = item else {
            panic!("item creation failed");
        };
        assert!(matches!(
            store.purchase_item(user, item.id).await,
            Ok(PurchaseOutcome::Purchased { new_balance: 50 })
        ));
        assert_eq!(
            store.set_active_avatar(user, item.id).await.ok(),
            Some(AvatarOutcome::Selected)
        );

        assert_eq!(store.delete_store_item(item.id).await.ok(), Some(true));

        let refreshed = store.get_user(user).await.ok().flatten();
        assert_eq!(refreshed.and_then(|u| u.active_avatar_id), None);
        assert_eq!(store.owns_item(user, item.id).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn interactions_require_a_known_user() {
        let (store, _, game) = store_with_game().await;
        let stranger = UserId::new();
        assert!(matches!(
            store.toggle_favorite(stranger, game).await,
            Err(StoreError::MissingReference(_))
        ));
        assert!(matches!(
            store.add_comment(stranger, game, "hi".to_owned()).await,
            Err(StoreError::MissingReference(_))
        ));
    }

    #[tokio::test]
    async fn renaming_onto_an_existing_category_conflicts() {
        let (store, _, _) = store_with_game().await;
        let puzzle = store
            .create_category(NewCategory {
                name: "Puzzle".to_owned(),
                icon: "brain".to_owned(),
            })
            .await;
        let Ok(puzzle) = puzzle else {
            panic!("category creation failed");
        };
        let renamed = store
            .update_category(
                puzzle.id,
                CategoryPatch {
                    name: Some("ACTION".to_owned()),
                    icon: None,
                },
            )
            .await;
        assert!(matches!(renamed, Err(StoreError::Conflict(_))));
    }
}
