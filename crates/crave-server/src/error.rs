//! Error types for the portal binary.

/// Top-level error for the portal binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Environment configuration was invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crave_api::ConfigError,
    },

    /// The storage backend could not be opened, migrated or seeded.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: crave_store::StoreError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: crave_api::ServerError,
    },
}
