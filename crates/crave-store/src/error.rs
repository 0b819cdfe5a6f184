//! Storage failures.
//!
//! "Not found" is never an error here: reads return `Option` or an empty
//! collection. [`StoreError`] is reserved for writes that could not be
//! applied and for backend failures, so callers can always tell absence
//! apart from breakage.

use crave_economy::EconomyError;

/// Failure of a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Any other database error.
    #[error("database error: {0}")]
    Postgres(sqlx::Error),

    /// Applying the schema migrations failed.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness constraint rejected the write (duplicate username,
    /// duplicate category name, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The write referenced a record that does not exist (e.g. a game
    /// pointing at an unknown category).
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A stored value could not be translated back into the domain model.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// A coin movement broke an economy rule (overflow, negative amount).
    #[error("economy rule violated: {0}")]
    Economy(#[from] EconomyError),

    /// The backend was configured with unusable settings.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict(db.constraint().unwrap_or("unique").to_owned());
            }
            if db.is_foreign_key_violation() {
                return Self::MissingReference(
                    db.constraint().unwrap_or("foreign key").to_owned(),
                );
            }
        }
        Self::Postgres(err)
    }
}
