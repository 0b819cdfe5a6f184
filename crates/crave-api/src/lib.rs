//! HTTP API for the Crave Games portal.
//!
//! Serves the JSON API consumed by the React UI, the playable content of
//! inline games and the uploaded images. All persistence goes through an
//! injected [`crave_store::Storage`]; identity is carried by a signed
//! session cookie backed by a server-side session store.
//!
//! # Architecture
//!
//! ```text
//! Browser --HTTP--> [Axum Router] --Arc<AppState>--> Arc<dyn Storage>
//!                        |
//!                        +-- SessionManagerLayer (crave.sid, signed, SessionCache)
//!                        +-- CorsLayer / TraceLayer
//!                        +-- /uploads (ServeDir)
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Environment-driven settings
//! - [`sessions`] -- Session record store with expiry sweeping
//! - [`cooldown`] -- Per-user click cooldown
//! - [`auth`] -- Password hashing, session keys and access extractors
//! - [`handlers`] -- Route handlers grouped by area
//! - [`router`] -- Route table and middleware
//! - [`server`] -- Listener lifecycle
//! - [`state`] -- Shared application state
//! - [`error`] -- Error types and their HTTP rendering

pub mod auth;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sessions;
pub mod state;

// Re-export primary types for convenience.
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
