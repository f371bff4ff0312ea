//! Database-backed integration tests.
//!
//! Each test creates its own database from `DATABASE_URL`, applies the
//! embedded migrations, drives the full router with `oneshot` and drops the
//! database afterwards. Without `DATABASE_URL` the tests log a skip and return.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use forum_api::{AppState, config::ApiConfig};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tower::ServiceExt;

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

struct TestDb {
    admin: PgPool,
    pool: PgPool,
    name: String,
}

impl TestDb {
    async fn create() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping database-backed test");
            return None;
        };
        let base = PgConnectOptions::from_str(&url).expect("parse DATABASE_URL");
        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(base.clone())
            .await
            .expect("connect to DATABASE_URL");

        let name = format!(
            "forum_test_{}_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_micros(),
            NEXT_DB.fetch_add(1, Ordering::Relaxed)
        );
        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&admin)
            .await
            .expect("create test database");

        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect_with(base.database(&name))
            .await
            .expect("connect to test database");
        forum_api::migrate(&pool).await.expect("migrate");

        Some(Self { admin, pool, name })
    }

    fn router(&self) -> Router {
        forum_api::router(AppState::new(
            self.pool.clone(),
            ApiConfig {
                bind_addr: "127.0.0.1:0".into(),
                database_url: String::new(),
                jwt_secret: "db-test-secret".into(),
                secure_cookies: false,
            },
        ))
    }

    async fn drop_db(self) {
        self.pool.close().await;
        sqlx::query(&format!(
            "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
            self.name
        ))
        .execute(&self.admin)
        .await
        .expect("drop test database");
    }
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, json)
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@forum.test"),
                "password": password,
            })),
        ),
    )
    .await
}

/// Log in as `username` and return the `token=...` cookie pair.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": format!("{username}@forum.test"), "password": password })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "login {username}");
    resp.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn first_category(app: &Router) -> i64 {
    let (status, categories) = send(app, request("GET", "/api/categories", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    categories[0]["id"].as_i64().expect("seeded category")
}

async fn create_topic(app: &Router, cookie: &str, title: &str, category_id: i64) -> i64 {
    let (status, topic) = send(
        app,
        request(
            "POST",
            "/api/topics",
            Some(cookie),
            Some(json!({ "title": title, "content": "body", "categoryId": category_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    topic["id"].as_i64().unwrap()
}

async fn reply(app: &Router, cookie: &str, topic_id: i64, content: &str) {
    let (status, _) = send(
        app,
        request(
            "POST",
            &format!("/api/topics/{topic_id}/replies"),
            Some(cookie),
            Some(json!({ "content": content })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn first_account_is_admin_and_duplicates_are_rejected() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let app = db.router();

    let (status, alice) = register(&app, "alice", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(alice["user"]["role"], "admin");

    let (status, bob) = register(&app, "bob", "secret2").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bob["user"]["role"], "user");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "carol", "email": "bob@forum.test", "password": "secret3" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "bob", "email": "carol@forum.test", "password": "secret3" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    db.drop_db().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_produce_one_admin() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let app = db.router();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move { register(&app, &format!("racer{i}"), "secret1").await })
        })
        .collect();

    let mut admins = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        if body["user"]["role"] == "admin" {
            admins += 1;
        }
    }
    assert_eq!(admins, 1);

    db.drop_db().await;
}

#[tokio::test]
async fn topics_replies_and_deduplicated_views() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let app = db.router();
    register(&app, "alice", "secret1").await;
    let cookie = login(&app, "alice", "secret1").await;
    let category_id = first_category(&app).await;

    let topic_id = create_topic(&app, &cookie, "Hello", category_id).await;
    reply(&app, &cookie, topic_id, "first!").await;

    let (status, topics) = send(&app, request("GET", "/api/topics", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(topics.as_array().unwrap().len(), 1);
    assert_eq!(topics[0]["replyCount"], 1);
    assert_eq!(topics[0]["author"]["username"], "alice");

    let (status, replies) = send(
        &app,
        request("GET", &format!("/api/topics/{topic_id}/replies"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replies[0]["content"], "first!");

    let view = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri(format!("/api/topics/{topic_id}/view"))
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };
    assert_eq!(send(&app, view("10.0.0.1")).await.1["counted"], true);
    assert_eq!(send(&app, view("10.0.0.1")).await.1["counted"], false);
    assert_eq!(send(&app, view("10.0.0.2")).await.1["counted"], true);

    let (_, topic) = send(&app, request("GET", &format!("/api/topics/{topic_id}"), None, None)).await;
    assert_eq!(topic["views"], 2);

    // A view of a missing topic is never remembered as counted.
    let missing = || {
        Request::builder()
            .method("POST")
            .uri("/api/topics/999999/view")
            .body(Body::empty())
            .unwrap()
    };
    assert_eq!(send(&app, missing()).await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, missing()).await.0, StatusCode::NOT_FOUND);

    db.drop_db().await;
}

#[tokio::test]
async fn profile_and_password_changes() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let app = db.router();
    register(&app, "alice", "secret1").await;
    register(&app, "bob", "secret2").await;
    let cookie = login(&app, "bob", "secret2").await;

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            "/api/user/profile",
            Some(&cookie),
            Some(json!({ "username": "alice", "email": "bob@forum.test" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        request(
            "PATCH",
            "/api/user/profile",
            Some(&cookie),
            Some(json!({ "username": "bobby", "email": "bob@forum.test" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["user"]["username"], "bobby");

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            "/api/user/password",
            Some(&cookie),
            Some(json!({ "currentPassword": "wrong!!", "newPassword": "secret9" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            "/api/user/password",
            Some(&cookie),
            Some(json!({ "currentPassword": "secret2", "newPassword": "secret9" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "bob@forum.test", "password": "secret2" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    login(&app, "bob", "secret9").await;

    db.drop_db().await;
}

#[tokio::test]
async fn messages_and_mark_read() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let app = db.router();
    let (_, alice) = register(&app, "alice", "secret1").await;
    let (_, bob) = register(&app, "bob", "secret2").await;
    let alice_id = alice["user"]["id"].as_i64().unwrap();
    let bob_id = bob["user"]["id"].as_i64().unwrap();
    let alice_cookie = login(&app, "alice", "secret1").await;
    let bob_cookie = login(&app, "bob", "secret2").await;

    let (status, sent) = send(
        &app,
        request(
            "POST",
            "/api/messages",
            Some(&bob_cookie),
            Some(json!({ "receiverId": alice_id, "content": "hi alice" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["isRead"], false);

    let mark = || {
        request(
            "POST",
            "/api/messages/mark-read",
            Some(&alice_cookie),
            Some(json!({ "senderId": bob_id })),
        )
    };
    assert_eq!(send(&app, mark()).await.1["updated"], 1);
    assert_eq!(send(&app, mark()).await.1["updated"], 0);

    let (status, inbox) = send(&app, request("GET", "/api/messages", Some(&alice_cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["isRead"], true);
    assert_eq!(inbox[0]["sender"]["username"], "bob");

    db.drop_db().await;
}

#[tokio::test]
async fn admin_deletes_cascade() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let app = db.router();
    let (_, alice) = register(&app, "alice", "secret1").await;
    let (_, bob) = register(&app, "bob", "secret2").await;
    let alice_id = alice["user"]["id"].as_i64().unwrap();
    let bob_id = bob["user"]["id"].as_i64().unwrap();
    let admin = login(&app, "alice", "secret1").await;
    let bob_cookie = login(&app, "bob", "secret2").await;
    let category_id = first_category(&app).await;

    let bobs_topic = create_topic(&app, &bob_cookie, "by bob", category_id).await;
    reply(&app, &admin, bobs_topic, "admin reply").await;
    let admins_topic = create_topic(&app, &admin, "by alice", category_id).await;
    reply(&app, &bob_cookie, admins_topic, "bob reply").await;
    reply(&app, &admin, admins_topic, "alice reply").await;
    send(
        &app,
        request(
            "POST",
            "/api/messages",
            Some(&bob_cookie),
            Some(json!({ "receiverId": alice_id, "content": "hello" })),
        ),
    )
    .await;

    // User delete: their topics (with all replies), their replies, their messages.
    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/admin/users/{bob_id}"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, request("GET", &format!("/api/topics/{bobs_topic}"), None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, replies) = send(
        &app,
        request("GET", &format!("/api/topics/{admins_topic}/replies"), None, None),
    )
    .await;
    assert_eq!(replies.as_array().unwrap().len(), 1);
    assert_eq!(replies[0]["content"], "alice reply");
    let (_, stats) = send(&app, request("GET", "/api/admin/stats", Some(&admin), None)).await;
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["messages"], 0);
    let (status, _) = send(&app, request("GET", "/api/auth/me", Some(&bob_cookie), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/admin/users/{bob_id}"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Topic delete takes its replies along.
    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/admin/topics/{admins_topic}"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        request("GET", &format!("/api/topics/{admins_topic}/replies"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Category delete takes its topics along.
    let (status, temp) = send(
        &app,
        request(
            "POST",
            "/api/admin/categories",
            Some(&admin),
            Some(json!({ "name": "Temporary" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let temp_id = temp["id"].as_i64().unwrap();
    let doomed = create_topic(&app, &admin, "short-lived", temp_id).await;
    reply(&app, &admin, doomed, "soon gone").await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/admin/categories",
            Some(&admin),
            Some(json!({ "name": "Temporary" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/admin/categories/{temp_id}"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, request("GET", &format!("/api/topics/{doomed}"), None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    db.drop_db().await;
}

#[tokio::test]
async fn role_change_applies_on_next_request() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let app = db.router();
    register(&app, "alice", "secret1").await;
    let (_, bob) = register(&app, "bob", "secret2").await;
    let bob_id = bob["user"]["id"].as_i64().unwrap();
    let admin = login(&app, "alice", "secret1").await;
    let bob_cookie = login(&app, "bob", "secret2").await;

    let (status, _) = send(&app, request("GET", "/api/admin/stats", Some(&bob_cookie), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, promoted) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/admin/users/{bob_id}/role"),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "admin");

    // Same cookie, token still says "user": the stored role decides.
    let (status, _) = send(&app, request("GET", "/api/admin/stats", Some(&bob_cookie), None)).await;
    assert_eq!(status, StatusCode::OK);

    db.drop_db().await;
}
