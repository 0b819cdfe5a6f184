//! Axum router construction for the portal API.
//!
//! Assembles all routes into a single [`Router`] wrapped in the session,
//! CORS and tracing layers, and mounts the upload directory at
//! `/uploads`.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post, put};
use rand::Rng;
use sha2::{Digest, Sha512};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::ApiConfig;
use crate::handlers::{self, account, admin, catalog, economy, interaction, play, upload};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "crave.sid";

/// Sessions expire after this many days without a request.
pub const SESSION_IDLE_DAYS: i64 = 7;

/// Request body limit on upload routes: the file cap plus room for the
/// multipart framing.
const UPLOAD_BODY_LIMIT: usize = 10_551_296;

/// Derive the cookie signing key.
///
/// A configured secret is stretched to 64 bytes with SHA-512. Without
/// one a random key is drawn, so sessions end when the process does.
pub fn signing_key(secret: Option<&str>) -> Key {
    if let Some(secret) = secret {
        return Key::from(Sha512::digest(secret.as_bytes()).as_slice());
    }
    tracing::warn!("SESSION_SECRET is not set, sessions will not survive a restart");
    let mut bytes = [0_u8; 64];
    rand::rng().fill(&mut bytes);
    Key::from(&bytes)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let Some(origin) = config.cors_allow_origin.as_deref() else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!(%origin, error = %e, "Ignoring unparsable CORS_ALLOW_ORIGIN");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build the complete Axum router for the portal.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `/api/me`, `/api/register`, `/api/login`, `/api/logout` -- accounts
/// - `/api/categories`, `/api/games`, `/api/home`, `/api/category/{name}`,
///   `/api/game/{id}` -- catalog
/// - `/api/favorite/{id}`, `/api/rate/{id}`, `/api/comment/{id}`,
///   `/api/favorites` -- interactions
/// - `/api/store`, `/api/store/buy/{id}`, `/api/inventory`,
///   `/api/inventory/set-avatar/{id}`, `/api/coins/click` -- economy
/// - `/api/admin/...` -- admin panel
/// - `GET /api/game/{id}/play` -- game content
/// - `/uploads/...` -- uploaded images
pub fn build_router(state: Arc<AppState>) -> Router {
    let config = &state.config;
    let sessions = SessionManagerLayer::new(state.sessions.clone())
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.cookie_secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            SESSION_IDLE_DAYS,
        )))
        .with_signed(signing_key(config.session_secret.as_deref()));
    let cors = cors_layer(config);
    let uploads = ServeDir::new(&config.upload_dir);

    let upload_routes = Router::new()
        .route("/api/admin/upload/thumbnail", post(upload::upload_thumbnail))
        .route("/api/admin/upload/avatar", post(upload::upload_avatar))
        .route("/api/admin/upload/game", post(upload::upload_game))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .route("/health", get(handlers::health))
        // Accounts
        .route("/api/me", get(account::me))
        .route("/api/register", post(account::register))
        .route("/api/login", post(account::login))
        .route("/api/logout", post(account::logout))
        // Catalog
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/games", get(catalog::list_games))
        .route("/api/home", get(catalog::home))
        .route("/api/category/{name}", get(catalog::category_games))
        .route("/api/game/{id}", get(catalog::game_detail))
        .route("/api/game/{id}/play", get(play::play_game))
        // Interactions
        .route("/api/favorite/{id}", post(interaction::toggle_favorite))
        .route("/api/rate/{id}", post(interaction::rate_game))
        .route("/api/comment/{id}", post(interaction::add_comment))
        .route("/api/favorites", get(interaction::list_favorites))
        // Economy
        .route("/api/store", get(economy::store))
        .route("/api/store/buy/{id}", post(economy::buy))
        .route("/api/inventory", get(economy::inventory))
        .route("/api/inventory/set-avatar/{id}", post(economy::set_avatar))
        .route("/api/coins/click", post(economy::click))
        // Admin
        .route("/api/admin/verify-password", post(admin::verify_password))
        .route("/api/admin/session", get(admin::session_status))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/games", post(admin::create_game))
        .route(
            "/api/admin/games/{id}",
            put(admin::update_game).delete(admin::delete_game),
        )
        .route("/api/admin/categories", post(admin::create_category))
        .route(
            "/api/admin/categories/{id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/api/admin/store-items", post(admin::create_store_item))
        .route(
            "/api/admin/store-items/{id}",
            put(admin::update_store_item).delete(admin::delete_store_item),
        )
        .merge(upload_routes)
        .nest_service("/uploads", uploads)
        .layer(sessions)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
