//! Shared type definitions for the Crave Games portal.
//!
//! This crate is the single source of truth for the records that flow
//! between the store, the API and the browser. Types defined here are
//! exported to `TypeScript` via `ts-rs` so the React UI stays in sync
//! with the wire format.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all record identifiers
//! - [`enums`] -- Game type, badge and store item type tags
//! - [`structs`] -- Entity records, creation inputs and partial updates

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Badge, GameType, ItemType};
pub use ids::{
    CategoryId, CommentId, FavoriteId, GameId, InventoryEntryId, RatingId, StoreItemId, UserId,
};
pub use structs::{
    Category, CategoryPatch, Comment, CommentWithUser, DEFAULT_CATEGORY_ICON, Favorite, Game,
    GamePatch, InventoryEntry, NewCategory, NewGame, NewStoreItem, NewUser, Rating,
    RatingSummary, STARTING_COINS, StoreItem, StoreItemPatch, UNKNOWN_USERNAME, User,
};
