//! Portal binary for Crave Games.
//!
//! Wires the storage backend into the HTTP API and serves it until the
//! process is asked to stop.
//!
//! # Startup Sequence
//!
//! 1. Load settings from the environment
//! 2. Initialize structured logging (tracing)
//! 3. Open the storage backend (`PostgreSQL` when `DATABASE_URL` is set,
//!    in-memory otherwise) and run migrations
//! 4. Seed the development catalog into an empty store
//! 5. Promote the accounts named in `ADMIN_USERNAMES`
//! 6. Serve HTTP until `Ctrl-C` / `SIGTERM`
//! 7. Close the database pool

mod config;
mod error;

use std::sync::Arc;

use crave_api::{AppState, start_server};
use crave_store::{
    MemoryStore, PostgresConfig, PostgresPool, PostgresStore, SeedReport, Storage, seed_catalog,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ServerSettings};
use crate::error::StartupError;

/// Application entry point for the portal server.
///
/// # Errors
///
/// Returns an error if any startup step fails or the server stops
/// abnormally.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load settings.
    let settings = ServerSettings::from_env()?;

    // 2. Initialize structured logging.
    init_tracing(settings.log_format);
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        backend = if settings.database_url.is_some() { "postgres" } else { "memory" },
        seed_data = settings.seed_data,
        "crave-server starting"
    );

    // 3. Open storage.
    let (store, pool) = open_store(&settings).await?;

    // 4. Seed data.
    if settings.seed_data {
        match seed_catalog(store.as_ref()).await.map_err(StartupError::from)? {
            SeedReport::Seeded {
                categories,
                games,
                store_items,
            } => info!(categories, games, store_items, "Seed catalog loaded"),
            SeedReport::Skipped => info!("Catalog already populated, seed skipped"),
        }
    }

    // 5. Promote configured admins.
    let promoted = promote_admins(store.as_ref(), &settings.api.admin_usernames).await?;
    if promoted > 0 {
        info!(promoted, "Promoted configured admin accounts");
    }

    // 6. Serve.
    let state = Arc::new(AppState::new(store, settings.api));
    let served = start_server(&settings.server, state).await;

    // 7. Close the pool whatever the outcome.
    if let Some(pool) = pool {
        pool.close().await;
        info!("Database pool closed");
    }
    served.map_err(StartupError::from)?;

    info!("crave-server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Select the storage backend. The pool is returned so it can be
/// closed on shutdown.
async fn open_store(
    settings: &ServerSettings,
) -> Result<(Arc<dyn Storage>, Option<PostgresPool>), StartupError> {
    let Some(url) = settings.database_url.as_deref() else {
        info!("DATABASE_URL not set, using in-memory storage");
        return Ok((Arc::new(MemoryStore::new()), None));
    };

    let config = PostgresConfig::new(url).with_max_connections(settings.max_connections);
    let pool = PostgresPool::connect(&config).await?;
    pool.run_migrations().await?;
    info!(
        max_connections = settings.max_connections,
        "PostgreSQL storage ready"
    );
    Ok((Arc::new(PostgresStore::new(&pool)), Some(pool)))
}

/// Grant the admin flag to existing accounts named in `usernames`.
///
/// Names without an account are skipped; registration grants the flag
/// when they sign up. Returns how many accounts changed.
async fn promote_admins(store: &dyn Storage, usernames: &[String]) -> Result<usize, StartupError> {
    let mut promoted = 0_usize;
    for username in usernames {
        match store.find_user_by_username(username).await? {
            Some(user) if !user.is_admin => {
                store.set_user_admin(user.id, true).await?;
                info!(user_id = %user.id, %username, "Granted admin role");
                promoted = promoted.saturating_add(1);
            }
            Some(_) => {}
            None => tracing::debug!(%username, "Admin username has no account yet"),
        }
    }
    Ok(promoted)
}
