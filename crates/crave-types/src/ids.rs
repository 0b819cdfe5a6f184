//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record in the portal has a strongly-typed ID so a game id can
//! never be passed where a user id is expected. All IDs use UUID v7
//! (time-ordered) for efficient database indexing.
//!
//! The `PostgreSQL` backend stores them as native `UUID` columns; the
//! in-memory backend generates them app-side via `new()`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a registered user.
    UserId
}

define_id! {
    /// Unique identifier for a game category.
    CategoryId
}

define_id! {
    /// Unique identifier for a game in the catalog.
    GameId
}

define_id! {
    /// Unique identifier for a favorite (user, game) record.
    FavoriteId
}

define_id! {
    /// Unique identifier for a rating (user, game) record.
    RatingId
}

define_id! {
    /// Unique identifier for a comment on a game.
    CommentId
}

define_id! {
    /// Unique identifier for an item sold in the coin store.
    StoreItemId
}

define_id! {
    /// Unique identifier for an ownership record in a user's inventory.
    InventoryEntryId
}
