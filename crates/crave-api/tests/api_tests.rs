//! Integration tests for the portal API.
//!
//! Tests drive the full router (sessions, CORS, tracing) through
//! `tower::ServiceExt::oneshot` without starting a TCP server. Each
//! [`Client`] remembers the `crave.sid` cookie it was handed, so a
//! sequence of calls behaves like one browser.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use crave_api::config::ApiConfig;
use crave_api::router::build_router;
use crave_api::state::AppState;
use crave_store::{MemoryStore, Storage, seed_catalog};
use crave_types::{CategoryId, Game, GameType, ItemType, NewCategory, NewGame, NewStoreItem};
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "password1";
const ADMIN_PASSWORD: &str = "letmein";

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    router: Router,
    state: Arc<AppState>,
    store: Arc<MemoryStore>,
    upload_dir: PathBuf,
}

fn test_config() -> ApiConfig {
    ApiConfig {
        session_secret: Some("integration-test-secret".to_owned()),
        admin_password: Some(ADMIN_PASSWORD.to_owned()),
        admin_usernames: vec!["root".to_owned()],
        bcrypt_cost: 4,
        upload_dir: std::env::temp_dir().join(format!("crave-uploads-{}", uuid::Uuid::new_v4())),
        ..ApiConfig::default()
    }
}

fn harness_with(config: ApiConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let upload_dir = config.upload_dir.clone();
    let state = Arc::new(AppState::new(
        Arc::clone(&store) as Arc<dyn Storage>,
        config,
    ));
    Harness {
        router: build_router(Arc::clone(&state)),
        state,
        store,
        upload_dir,
    }
}

fn harness() -> Harness {
    harness_with(test_config())
}

async fn seeded_harness() -> Harness {
    let h = harness();
    seed_catalog(&*h.store).await.unwrap();
    h
}

impl Harness {
    fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
        }
    }

    async fn any_game(&self) -> Game {
        self.store.list_games().await.unwrap().into_iter().next().unwrap()
    }

    async fn add_category(&self, name: &str) -> CategoryId {
        self.store
            .create_category(NewCategory {
                name: name.to_owned(),
                icon: "gamepad-2".to_owned(),
            })
            .await
            .unwrap()
            .id
    }

    async fn add_game(&self, name: &str, kind: GameType, iframe: Option<&str>, html: Option<&str>) -> Game {
        let category_id = self.add_category(&format!("{name} category")).await;
        self.store
            .create_game(NewGame {
                name: name.to_owned(),
                description: None,
                instructions: None,
                category_id,
                thumbnail_url: "https://img/thumb.png".to_owned(),
                iframe_url: iframe.map(str::to_owned),
                html_content: html.map(str::to_owned),
                kind,
                badge: None,
                trending: false,
            })
            .await
            .unwrap()
    }

    async fn add_item(&self, name: &str, price: i64) -> String {
        self.store
            .create_store_item(NewStoreItem {
                name: name.to_owned(),
                image_url: format!("https://img/{name}.svg"),
                price,
                item_type: ItemType::Avatar,
            })
            .await
            .unwrap()
            .id
            .to_string()
    }
}

struct Client {
    router: Router,
    cookie: Option<String>,
}

impl Client {
    async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .trim()
                .to_owned();
            let has_value = pair.split_once('=').is_some_and(|(_, v)| !v.is_empty());
            self.cookie = has_value.then_some(pair);
        }
        response
    }

    fn builder(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn raw(&mut self, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let builder = self.builder(method, uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn call(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.raw(method, uri, body).await;
        let status = response.status();
        (status, body_to_json(response.into_body()).await)
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    async fn post(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body)).await
    }

    async fn post_empty(&mut self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::POST, uri, None).await
    }

    async fn put(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(body)).await
    }

    async fn delete(&mut self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, None).await
    }

    async fn register(&mut self, username: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/register",
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register {username}: {body}");
        body
    }

    async fn verified_admin(h: &Harness) -> Self {
        let mut admin = h.client();
        admin.register("root").await;
        let (status, _) = admin
            .post(
                "/api/admin/verify-password",
                json!({ "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        admin
    }

    async fn upload(&mut self, uri: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let boundary = "crave-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = self
            .builder(Method::POST, uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = self.send(request).await;
        let status = response.status();
        (status, body_to_json(response.into_body()).await)
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

// ---------------------------------------------------------------------------
// Health and accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let h = harness();
    let (status, body) = h.client().get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn anonymous_me_is_null() {
    let h = harness();
    let (status, body) = h.client().get("/api/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn register_logs_in_with_starting_coins() {
    let h = harness();
    let mut client = h.client();
    let user = client.register("player1").await;
    assert_eq!(user["username"], "player1");
    assert_eq!(user["craveCoins"], 100);
    assert_eq!(user["isAdmin"], false);
    assert!(user.get("passwordHash").is_none());

    let (_, me) = client.get("/api/me").await;
    assert_eq!(me["id"], user["id"]);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let h = harness();
    h.client().register("player1").await;
    let (status, body) = h
        .client()
        .post(
            "/api/register",
            json!({ "username": "player1", "password": "another1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn registration_reports_the_first_invalid_field() {
    let h = harness();
    let (status, body) = h
        .client()
        .post("/api/register", json!({ "username": "ab", "password": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username must be 3-32 characters");

    let (status, body) = h
        .client()
        .post("/api/register", json!({ "username": "abc", "password": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be 6-128 characters");
}

#[tokio::test]
async fn configured_admin_usernames_register_as_admins() {
    let h = harness();
    let root = h.client().register("root").await;
    assert_eq!(root["isAdmin"], true);
}

#[tokio::test]
async fn bad_password_and_unknown_user_look_the_same() {
    let h = harness();
    h.client().register("player1").await;

    let (wrong_status, wrong_body) = h
        .client()
        .post(
            "/api/login",
            json!({ "username": "player1", "password": "not-it" }),
        )
        .await;
    let (unknown_status, unknown_body) = h
        .client()
        .post(
            "/api/login",
            json!({ "username": "nobody", "password": "not-it" }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_and_logout() {
    let h = harness();
    h.client().register("player1").await;

    let mut client = h.client();
    let (status, user) = client
        .post(
            "/api/login",
            json!({ "username": "player1", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "player1");

    let (status, body) = client.post_empty("/api/logout").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, me) = client.get("/api/me").await;
    assert_eq!(me, Value::Null);
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let h = seeded_harness().await;
    let game = h.any_game().await;
    let mut anon = h.client();

    let (status, body) = anon.post_empty(&format!("/api/favorite/{}", game.id)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");

    let (status, _) = anon.get("/api/inventory").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = anon.post_empty("/api/coins/click").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn catalog_listings() {
    let h = seeded_harness().await;
    let mut client = h.client();

    let (_, categories) = client.get("/api/categories").await;
    assert_eq!(categories.as_array().unwrap().len(), 5);

    let (_, games) = client.get("/api/games").await;
    assert_eq!(games.as_array().unwrap().len(), 15);

    let (_, found) = client.get("/api/games?search=RACE").await;
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Street Racer"));
    assert!(!names.contains(&"Golf Master"));

    let (status, puzzle) = client.get("/api/category/Puzzle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(puzzle.as_array().unwrap().len(), 3);

    let (status, body) = client.get("/api/category/Knitting").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");
}

#[tokio::test]
async fn home_groups_games_by_non_empty_category() {
    let h = seeded_harness().await;
    h.add_category("Empty Shelf").await;

    let (status, home) = h.client().get("/api/home").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(home["trendingGames"].as_array().unwrap().len(), 5);

    let groups = home["gamesByCategory"].as_array().unwrap();
    assert_eq!(groups.len(), 5);
    for group in groups {
        let games = group["games"].as_array().unwrap();
        assert!(!games.is_empty() && games.len() <= 10);
        assert_ne!(group["category"]["name"], "Empty Shelf");
    }
}

#[tokio::test]
async fn game_detail_counts_a_play_and_lists_related_games() {
    let h = seeded_harness().await;
    let game = h.any_game().await;
    let mut client = h.client();

    let (status, detail) = client.get(&format!("/api/game/{}", game.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["game"]["playCount"], 1);
    assert_eq!(detail["isFavorite"], false);
    assert_eq!(detail["userRating"], Value::Null);

    let related = detail["relatedGames"].as_array().unwrap();
    assert!(related.len() <= 8);
    for other in related {
        assert_ne!(other["id"], detail["game"]["id"]);
        assert_eq!(other["categoryId"], detail["game"]["categoryId"]);
    }

    let (_, again) = client.get(&format!("/api/game/{}", game.id)).await;
    assert_eq!(again["game"]["playCount"], 2);
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let h = harness();
    let (status, _) = h.client().get("/api/game/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .client()
        .get(&format!("/api/game/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Game not found");
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn favorite_toggles_on_then_off() {
    let h = seeded_harness().await;
    let game = h.any_game().await;
    let mut client = h.client();
    client.register("player1").await;
    let uri = format!("/api/favorite/{}", game.id);

    let (_, first) = client.post_empty(&uri).await;
    assert_eq!(first, json!({ "isFavorite": true }));
    let (_, favorites) = client.get("/api/favorites").await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    let (_, second) = client.post_empty(&uri).await;
    assert_eq!(second, json!({ "isFavorite": false }));
    let (_, favorites) = client.get("/api/favorites").await;
    assert!(favorites.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ratings_average_and_overwrite() {
    let h = seeded_harness().await;
    let game = h.any_game().await;
    let uri = format!("/api/rate/{}", game.id);

    let mut alice = h.client();
    alice.register("alice").await;
    let mut bob = h.client();
    bob.register("bob").await;

    alice.post(&uri, json!({ "rating": 3 })).await;
    let (status, body) = bob.post(&uri, json!({ "rating": 5 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["ratingCount"], 2);
    assert!((body["averageRating"].as_f64().unwrap() - 4.0).abs() < f64::EPSILON);

    let (_, body) = alice.post(&uri, json!({ "rating": 1 })).await;
    assert_eq!(body["ratingCount"], 2);
    assert!((body["averageRating"].as_f64().unwrap() - 3.0).abs() < f64::EPSILON);

    let (_, detail) = alice.get(&format!("/api/game/{}", game.id)).await;
    assert_eq!(detail["userRating"], 1);
}

#[tokio::test]
async fn out_of_range_ratings_are_rejected() {
    let h = seeded_harness().await;
    let game = h.any_game().await;
    let uri = format!("/api/rate/{}", game.id);
    let mut client = h.client();
    client.register("player1").await;

    for bad in [json!(0), json!(6), json!(3.5), json!("4"), Value::Null] {
        let (status, body) = client.post(&uri, json!({ "rating": bad })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {bad}");
        assert_eq!(body["error"], "Rating must be between 1 and 5");
    }

    let (status, _) = client
        .post(
            &format!("/api/rate/{}", uuid::Uuid::new_v4()),
            json!({ "rating": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_are_trimmed_and_attributed() {
    let h = seeded_harness().await;
    let game = h.any_game().await;
    let uri = format!("/api/comment/{}", game.id);
    let mut client = h.client();
    client.register("player1").await;

    let (status, body) = client.post(&uri, json!({ "content": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Comment cannot be empty");

    let (status, _) = client
        .post(&uri, json!({ "content": "x".repeat(2001) }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, comment) = client.post(&uri, json!({ "content": "  great game  " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["content"], "great game");
    assert_eq!(comment["username"], "player1");

    let (_, detail) = client.get(&format!("/api/game/{}", game.id)).await;
    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["username"], "player1");
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn purchase_rules() {
    let h = harness();
    let exact = h.add_item("Exact", 100).await;
    let pricey = h.add_item("Pricey", 500).await;
    let mut client = h.client();
    client.register("player1").await;

    let (status, body) = client.post_empty(&format!("/api/store/buy/{exact}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "newBalance": 0 }));

    let (status, body) = client.post_empty(&format!("/api/store/buy/{exact}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already owned");

    let (status, body) = client.post_empty(&format!("/api/store/buy/{pricey}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not enough coins");

    let (_, me) = client.get("/api/me").await;
    assert_eq!(me["craveCoins"], 0);

    let (status, _) = client
        .post_empty(&format!("/api/store/buy/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, store) = client.get("/api/store").await;
    assert_eq!(store["items"].as_array().unwrap().len(), 2);
    assert_eq!(store["ownedItemIds"], json!([exact]));
}

#[tokio::test]
async fn anonymous_store_has_no_owned_items() {
    let h = harness();
    h.add_item("Crown", 2500).await;
    let (status, store) = h.client().get("/api/store").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store["items"].as_array().unwrap().len(), 1);
    assert_eq!(store["ownedItemIds"], json!([]));
}

#[tokio::test]
async fn avatar_selection_requires_ownership() {
    let h = harness();
    let owned = h.add_item("Owned", 50).await;
    let other = h.add_item("Other", 50).await;
    let mut client = h.client();
    client.register("player1").await;
    client.post_empty(&format!("/api/store/buy/{owned}")).await;

    let (status, body) = client
        .post_empty(&format!("/api/inventory/set-avatar/{other}"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Item not owned");

    let (status, body) = client
        .post_empty(&format!("/api/inventory/set-avatar/{owned}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, me) = client.get("/api/me").await;
    assert_eq!(me["activeAvatarId"], json!(owned));

    let (_, inventory) = client.get("/api/inventory").await;
    assert_eq!(inventory["activeAvatarId"], json!(owned));
    assert_eq!(inventory["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn clicking_earns_one_to_three_coins() {
    let h = harness();
    let mut client = h.client();
    client.register("player1").await;

    let mut balance = 100;
    for _ in 0..5 {
        let (status, body) = client.post_empty("/api/coins/click").await;
        assert_eq!(status, StatusCode::OK);
        let earned = body["coinsEarned"].as_i64().unwrap();
        assert!((1..=3).contains(&earned));
        balance += earned;
        assert_eq!(body["newBalance"], balance);
    }
}

#[tokio::test]
async fn click_cooldown_limits_rapid_clicks() {
    let h = harness_with(ApiConfig {
        click_cooldown: Duration::from_secs(60),
        ..test_config()
    });
    let mut client = h.client();
    client.register("player1").await;

    let (status, _) = client.post_empty("/api/coins/click").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client.post_empty("/api/coins/click").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn click_cooldown_survives_a_fresh_login() {
    let h = harness_with(ApiConfig {
        click_cooldown: Duration::from_secs(60),
        ..test_config()
    });
    let mut client = h.client();
    client.register("player1").await;

    let (status, _) = client.post_empty("/api/coins/click").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = client.post_empty("/api/logout").await;
    assert_eq!(status, StatusCode::OK);
    let mut relogged = h.client();
    let (status, _) = relogged
        .post(
            "/api/login",
            json!({ "username": "player1", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = relogged.post_empty("/api/coins/click").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["status"], 429);

    let mut other = h.client();
    other.register("player2").await;
    let (status, _) = other.post_empty("/api/coins/click").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_discards_the_session_record() {
    let h = harness();
    let mut client = h.client();
    client.register("player1").await;
    assert_eq!(h.state.sessions.len().await, 1);

    let (status, _) = client.post_empty("/api/logout").await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.state.sessions.is_empty().await);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_gate_needs_both_role_and_password() {
    let h = harness();

    let mut player = h.client();
    player.register("player1").await;
    let (status, body) = player.get("/api/admin/dashboard").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");
    let (status, _) = player
        .post(
            "/api/admin/verify-password",
            json!({ "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut root = h.client();
    root.register("root").await;
    let (status, body) = root.get("/api/admin/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Admin password verification required");
    let (_, session) = root.get("/api/admin/session").await;
    assert_eq!(session, json!({ "verified": false }));

    let (status, body) = root
        .post("/api/admin/verify-password", json!({ "password": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid admin password");

    let (status, _) = root
        .post(
            "/api/admin/verify-password",
            json!({ "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, session) = root.get("/api/admin/session").await;
    assert_eq!(session, json!({ "verified": true }));

    let (status, dashboard) = root.get("/api/admin/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(dashboard["games"].is_array());
    assert!(dashboard["categories"].is_array());
    assert!(dashboard["storeItems"].is_array());
}

#[tokio::test]
async fn unconfigured_admin_password_is_a_server_error() {
    let h = harness_with(ApiConfig {
        admin_password: None,
        ..test_config()
    });
    let mut root = h.client();
    root.register("root").await;
    let (status, body) = root
        .post("/api/admin/verify-password", json!({ "password": "anything" }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Admin password not configured");
}

#[tokio::test]
async fn admin_game_and_category_crud() {
    let h = harness();
    let mut admin = Client::verified_admin(&h).await;

    let (status, category) = admin
        .post("/api/admin/categories", json!({ "name": "Arcade" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["icon"], "gamepad-2");
    let category_id = category["id"].as_str().unwrap().to_owned();

    let (status, _) = admin
        .post("/api/admin/categories", json!({ "name": "arcade" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = admin
        .post(
            "/api/admin/games",
            json!({
                "name": "Orphan",
                "categoryId": uuid::Uuid::new_v4(),
                "thumbnailUrl": "https://img/o.png",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown category");

    let (status, body) = admin
        .post(
            "/api/admin/games",
            json!({
                "name": "  ",
                "categoryId": category_id,
                "thumbnailUrl": "https://img/o.png",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Game name is required");

    let (status, game) = admin
        .post(
            "/api/admin/games",
            json!({
                "name": "Pac Dash",
                "description": "Eat the dots",
                "categoryId": category_id,
                "thumbnailUrl": "https://img/pac.png",
                "iframeUrl": "https://games.example/pac",
                "type": "iframe",
                "badge": "new",
                "isTrending": true,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{game}");
    assert_eq!(game["badge"], "new");
    assert_eq!(game["isTrending"], true);
    assert_eq!(game["playCount"], 0);
    let game_id = game["id"].as_str().unwrap().to_owned();

    let (status, updated) = admin
        .put(
            &format!("/api/admin/games/{game_id}"),
            json!({ "description": "", "badge": "", "name": "Pac Dash 2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Pac Dash 2");
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["badge"], Value::Null);
    assert_eq!(updated["iframeUrl"], "https://games.example/pac");

    let (status, body) = admin
        .delete(&format!("/api/admin/categories/{category_id}"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, _) = admin.delete(&format!("/api/admin/games/{game_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = admin.delete(&format!("/api/admin/games/{game_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, renamed) = admin
        .put(
            &format!("/api/admin/categories/{category_id}"),
            json!({ "name": "Retro", "icon": "joystick" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Retro");
    assert_eq!(renamed["icon"], "joystick");

    let (status, _) = admin
        .delete(&format!("/api/admin/categories/{category_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = admin
        .delete(&format!("/api/admin/categories/{category_id}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_store_item_crud() {
    let h = harness();
    let mut admin = Client::verified_admin(&h).await;

    let (status, body) = admin
        .post(
            "/api/admin/store-items",
            json!({ "name": "Crown", "imageUrl": "https://img/crown.svg", "price": -5 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Price cannot be negative");

    let (status, item) = admin
        .post(
            "/api/admin/store-items",
            json!({ "name": "Crown", "imageUrl": "https://img/crown.svg", "price": 2500 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["itemType"], "avatar");
    let id = item["id"].as_str().unwrap().to_owned();

    let (_, updated) = admin
        .put(&format!("/api/admin/store-items/{id}"), json!({ "price": 2000 }))
        .await;
    assert_eq!(updated["price"], 2000);
    assert_eq!(updated["name"], "Crown");

    let (status, _) = admin.delete(&format!("/api/admin/store-items/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = admin
        .put(&format!("/api/admin/store-items/{id}"), json!({ "price": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Store item not found");
}

#[tokio::test]
async fn uploads() {
    let h = harness();
    let mut admin = Client::verified_admin(&h).await;

    let (status, body) = admin
        .upload("/api/admin/upload/thumbnail", "cat.PNG", "image/png", b"\x89PNG fake")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let url = body["url"].as_str().unwrap().to_owned();
    assert!(url.starts_with("/uploads/thumbnails/thumb-"));
    assert!(url.ends_with(".png"));
    let stored = h
        .upload_dir
        .join(url.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(&stored).unwrap(), b"\x89PNG fake");

    let served = admin.raw(Method::GET, &url, None).await;
    assert_eq!(served.status(), StatusCode::OK);

    let (status, body) = admin
        .upload("/api/admin/upload/avatar", "notes.txt", "text/plain", b"hello")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only image files are allowed");

    let (status, body) = admin
        .upload(
            "/api/admin/upload/game",
            "game.html",
            "text/html",
            b"<html><body>hi</body></html>",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["htmlContent"], "<html><body>hi</body></html>");

    let mut player = h.client();
    player.register("player1").await;
    let (status, _) = player
        .upload("/api/admin/upload/thumbnail", "cat.png", "image/png", b"x")
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn uploads_without_a_form_are_json_bad_requests() {
    let h = harness();
    let mut admin = Client::verified_admin(&h).await;

    for uri in [
        "/api/admin/upload/thumbnail",
        "/api/admin/upload/avatar",
        "/api/admin/upload/game",
    ] {
        let (status, body) = admin.post(uri, json!({ "file": "cat.png" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
        assert_eq!(body["status"], 400, "{uri}");
    }
}

#[tokio::test]
async fn undecodable_path_segments_are_json_bad_requests() {
    let h = harness();
    let (status, body) = h.client().get("/api/game/%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
    assert_eq!(body["status"], 400);

    let (status, body) = h.client().get("/api/category/%C0%AF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

// ---------------------------------------------------------------------------
// Game content
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inline_games_are_served_sandboxed() {
    let h = harness();
    let game = h
        .add_game("Inline", GameType::Uploaded, None, Some("<h1>play</h1>"))
        .await;
    let response = h
        .client()
        .raw(Method::GET, &format!("/api/game/{}/play", game.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(
        headers[header::CONTENT_SECURITY_POLICY],
        "sandbox allow-scripts allow-pointer-lock allow-popups"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>play</h1>");
}

#[tokio::test]
async fn external_games_redirect() {
    let h = harness();
    let game = h
        .add_game("Remote", GameType::Iframe, Some("https://games.example/remote"), None)
        .await;
    let response = h
        .client()
        .raw(Method::GET, &format!("/api/game/{}/play", game.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://games.example/remote"
    );
}

#[tokio::test]
async fn games_without_content_are_not_found() {
    let h = harness();
    let game = h.add_game("Empty", GameType::Embed, None, None).await;
    let (status, body) = h
        .client()
        .get(&format!("/api/game/{}/play", game.id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Game content not available");
}
