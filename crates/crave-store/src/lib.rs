//! Data access layer for the Crave Games portal.
//!
//! Every handler talks to storage through the [`Storage`] trait. Two
//! interchangeable backends implement it:
//!
//! ```text
//! crave-api handlers
//!     |
//!     +-- Arc<dyn Storage>
//!           |-- MemoryStore    (maps behind one RwLock; dev + tests)
//!           +-- PostgresStore  (sqlx over PgPool; production)
//! ```
//!
//! # Modules
//!
//! - [`storage`] -- The `Storage` trait and compound-operation outcomes
//! - [`memory`] -- In-process backend
//! - [`postgres`] -- `PostgreSQL` pool, configuration and backend
//! - [`rows`] -- Row structs and column translation for `PostgreSQL`
//! - [`seed`] -- Development catalog
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod postgres;
pub mod rows;
pub mod seed;
pub mod storage;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool, PostgresStore};
pub use seed::{SeedReport, seed_catalog};
pub use storage::{AvatarOutcome, CategoryDeletion, PurchaseOutcome, Storage};
