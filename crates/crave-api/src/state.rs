//! Shared application state for the portal API.
//!
//! [`AppState`] is built once by the binary and handed to the router
//! behind an `Arc`. Persistent data lives in the store; the state also
//! owns the session records and the per-user click cooldown, which last
//! only as long as the process.

use std::sync::Arc;

use crave_store::Storage;

use crate::config::ApiConfig;
use crate::cooldown::ClickCooldown;
use crate::sessions::SessionCache;

/// State shared by every handler.
pub struct AppState {
    /// The active storage backend.
    pub store: Arc<dyn Storage>,
    /// API settings.
    pub config: ApiConfig,
    /// Server-side session records.
    pub sessions: SessionCache,
    /// Last accepted coin click per user.
    pub clicks: ClickCooldown,
}

impl AppState {
    /// Wrap a backend and its configuration.
    pub fn new(store: Arc<dyn Storage>, config: ApiConfig) -> Self {
        Self {
            store,
            config,
            sessions: SessionCache::new(),
            clicks: ClickCooldown::new(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
