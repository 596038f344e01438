//! HTTP tests for the site API, dispatched through the full router with
//! `oneshot` against the in-memory content store.

use api_lib::adapters::{hash_password, MemoryContentStore};
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use site_core::chat::{TypingDelay, FALLBACK_REPLY, GREETING_REPLY};
use site_core::domain::{AdminCredentials, NewBlogPost, NewFeedbackSubmission};
use site_core::ports::ContentStore;
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN: &str = "admin";
const PASSWORD: &str = "correct horse";

fn app(store: Arc<MemoryContentStore>) -> Router {
    build_router(Arc::new(AppState::new(store, Arc::new(Config::local()))))
}

async fn seeded_store() -> Arc<MemoryContentStore> {
    let store = Arc::new(MemoryContentStore::new());
    store
        .upsert_admin_credentials(AdminCredentials {
            username: ADMIN.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
        })
        .await
        .unwrap();
    store
}

fn post(title: &str, category: &str, published: bool) -> NewBlogPost {
    NewBlogPost {
        title: title.to_string(),
        excerpt: "Short".to_string(),
        content: "Long".to_string(),
        author: "Team".to_string(),
        category: category.to_string(),
        tags: vec![],
        read_time: "3 min".to_string(),
        image: "/img.png".to_string(),
        published,
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Logs in and returns the `session=<token>` pair for later requests.
async fn login(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "username": ADMIN, "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
    set_cookie.split(';').next().unwrap().to_string()
}

// ===========================================================================
// Public surface
// ===========================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = app(Arc::new(MemoryContentStore::new()));
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn contact_form_validates_and_stores() {
    let store = Arc::new(MemoryContentStore::new());
    let app = app(store.clone());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/contact",
            json!({ "name": "Asha", "email": "asha@example.com", "company": " ", "message": "Hello" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "new");
    assert!(body["company"].is_null());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/contact",
            json!({ "name": "Asha", "email": "", "message": "Hello" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.list_contacts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn feedback_rating_must_be_in_range() {
    let app = app(Arc::new(MemoryContentStore::new()));
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/feedback",
            json!({ "name": "Ravi", "email": "r@example.com", "rating": 6, "feedback": "Great" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blog_lists_only_published_posts_and_clamps_the_page() {
    let store = Arc::new(MemoryContentStore::new());
    for i in 0..12 {
        store
            .create_blog_post(post(&format!("Post {}", i), "AI", true))
            .await
            .unwrap();
    }
    let draft = store.create_blog_post(post("Draft", "AI", false)).await.unwrap();
    store.create_blog_post(post("Other", "Cloud", true)).await.unwrap();
    let app = app(store);

    let (status, body) = send(&app, get("/blog?page=9&per_page=5&category=AI", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 12);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["current_page"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/blog?category=All", None)).await;
    assert_eq!(body["total_items"], 13);

    let (status, _) = send(&app, get(&format!("/blog/{}", draft.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_listing_has_no_pages() {
    let app = app(Arc::new(MemoryContentStore::new()));
    let (status, body) = send(&app, get("/events?page=4", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pages"], 0);
    assert_eq!(body["current_page"], 1);

    let (status, _) = send(&app, get("/events?per_page=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ===========================================================================
// Mail link
// ===========================================================================

#[tokio::test]
async fn compose_redirects_by_device() {
    let app = app(Arc::new(MemoryContentStore::new()));

    let req = Request::builder()
        .uri("/contact/compose?subject=Hello%20team")
        .header(header::USER_AGENT, "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()[header::LOCATION],
        "mailto:snehasama7@gmail.com?subject=Hello%20team"
    );

    let req = Request::builder()
        .uri("/contact/compose?subject=Quote")
        .header(header::USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64)")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers()[header::LOCATION],
        "https://mail.google.com/mail/?view=cm&fs=1&to=snehasama7@gmail.com&su=Quote"
    );
}

// ===========================================================================
// Chat
// ===========================================================================

#[tokio::test]
async fn chat_round_trip() {
    let app = app(Arc::new(MemoryContentStore::new()));

    let (status, body) = send(&app, json_request("POST", "/chat", json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let chat_id = body["chat_id"].as_str().unwrap().to_string();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["is_bot"], true);

    let uri = format!("/chat/{}/messages", chat_id);
    let (status, body) = send(&app, json_request("POST", &uri, json!({ "text": "hi" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["text"], "hi");
    assert_eq!(body["reply"]["text"], GREETING_REPLY);

    let (_, body) = send(&app, json_request("POST", &uri, json!({ "text": "xyz123" }))).await;
    assert_eq!(body["reply"]["text"], FALLBACK_REPLY);

    let (status, _) = send(&app, json_request("POST", &uri, json!({ "text": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get(&format!("/chat/{}", chat_id), None)).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 5);

    let close = Request::builder()
        .method("DELETE")
        .uri(format!("/chat/{}", chat_id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, close).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, json_request("POST", &uri, json!({ "text": "hello" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn closing_a_chat_drops_the_pending_reply() {
    let config = Config {
        typing_delay: TypingDelay {
            base: std::time::Duration::from_millis(300),
            jitter: std::time::Duration::ZERO,
            option: std::time::Duration::ZERO,
        },
        ..Config::local()
    };
    let state = Arc::new(AppState::new(
        Arc::new(MemoryContentStore::new()),
        Arc::new(config),
    ));
    let app = build_router(state.clone());

    let (_, body) = send(&app, json_request("POST", "/chat", json!({}))).await;
    let chat_id = body["chat_id"].as_str().unwrap().to_string();
    let handle = state.chats.get(chat_id.parse().unwrap()).await.unwrap();

    let pending = tokio::spawn({
        let app = app.clone();
        let uri = format!("/chat/{}/messages", chat_id);
        async move { send(&app, json_request("POST", &uri, json!({ "text": "hi" }))).await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let close = Request::builder()
        .method("DELETE")
        .uri(format!("/chat/{}", chat_id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, close).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = pending.await.unwrap();
    assert_eq!(status, StatusCode::GONE);

    // Greeting plus the user's message; the bot reply never lands.
    let session = handle.session.lock().await;
    assert_eq!(session.messages().len(), 2);
    assert!(!session.messages()[1].is_bot);
}

// ===========================================================================
// Admin
// ===========================================================================

#[tokio::test]
async fn admin_routes_need_a_session() {
    let app = app(seeded_store().await);
    let (status, _) = send(&app, get("/admin/overview", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, get("/auth/me", Some("session=made-up"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = app(seeded_store().await);
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": ADMIN, "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_opens_the_dashboard_until_logout() {
    let store = seeded_store().await;
    let app = app(store.clone());
    let cookie = login(&app).await;

    let (status, body) = send(&app, get("/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], ADMIN);

    send(
        &app,
        json_request(
            "POST",
            "/contact",
            json!({ "name": "Asha", "email": "a@example.com", "message": "Hi" }),
        ),
    )
    .await;
    let (status, body) = send(&app, get("/admin/overview", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_contacts"], 1);
    assert_eq!(body["new_contacts"], 1);

    let logout = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, logout).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sessions_older_than_a_day_are_rejected() {
    let store = seeded_store().await;
    store
        .create_admin_session("stale", ADMIN, Utc::now() - Duration::hours(25))
        .await
        .unwrap();
    store
        .create_admin_session("fresh", ADMIN, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    let app = app(store.clone());

    let (status, _) = send(&app, get("/auth/me", Some("session=stale"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.get_admin_session("stale").await.is_err());

    let (status, _) = send(&app, get("/auth/me", Some("session=fresh"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_purges_sessions_nobody_came_back_for() {
    let store = seeded_store().await;
    store
        .create_admin_session("abandoned", ADMIN, Utc::now() - Duration::hours(48))
        .await
        .unwrap();
    let app = app(store.clone());

    let cookie = login(&app).await;
    assert!(store.get_admin_session("abandoned").await.is_err());
    let token = cookie.trim_start_matches("session=");
    assert!(store.get_admin_session(token).await.is_ok());
}

#[tokio::test]
async fn promoted_feedback_becomes_a_testimonial() {
    let store = seeded_store().await;
    let feedback = store
        .insert_feedback(NewFeedbackSubmission {
            name: "Mina".to_string(),
            email: "mina@example.com".to_string(),
            rating: 5,
            feedback: "Excellent work".to_string(),
            position: Some("CTO".to_string()),
            company: None,
        })
        .await
        .unwrap();
    let app = app(store);
    let cookie = login(&app).await;

    let (_, body) = send(&app, get("/testimonials", None)).await;
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = send(&app, get("/admin/testimonials/candidates", Some(&cookie))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let promote = Request::builder()
        .method("POST")
        .uri(format!("/admin/testimonials/{}", feedback.id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, promote).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_testimonial"], true);

    let (_, body) = send(&app, get("/testimonials", None)).await;
    assert_eq!(body[0]["name"], "Mina");

    let (_, body) = send(&app, get("/admin/testimonials/candidates", Some(&cookie))).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn contact_status_moves_along() {
    let store = seeded_store().await;
    let app = app(store.clone());
    let cookie = login(&app).await;
    let (_, contact) = send(
        &app,
        json_request(
            "POST",
            "/contact",
            json!({ "name": "Asha", "email": "a@example.com", "message": "Hi" }),
        ),
    )
    .await;

    let mut req = json_request(
        "PUT",
        &format!("/admin/contacts/{}/status", contact["id"]),
        json!({ "status": "contacted" }),
    );
    req.headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "contacted");

    let (_, body) = send(&app, get("/admin/overview", Some(&cookie))).await;
    assert_eq!(body["new_contacts"], 0);

    let mut req = json_request("PUT", "/admin/contacts/999/status", json!({ "status": "closed" }));
    req.headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
