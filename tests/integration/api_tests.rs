//! API integration tests
//!
//! The router tests run in-process over the in-memory store. The `live_*`
//! tests need a server on localhost:3000 backed by MongoDB.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_server::{config::AppConfig, create_router, repository::Repository, AppState};

fn app() -> Router {
    create_router(AppState::new(AppConfig::default(), Repository::memory()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/register",
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["inserted_id"].as_str().unwrap().to_string()
}

async fn add_book(app: &Router, title: &str) -> String {
    let (status, body) = send(app, Method::POST, "/book", Some(json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["inserted_id"].as_str().unwrap().to_string()
}

async fn borrow(app: &Router, user_id: &str, book_id: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/borrow",
        Some(json!({ "user_id": user_id, "book_id": book_id })),
    )
    .await
}

async fn give_back(app: &Router, user_id: &str, book_id: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/return",
        Some(json!({ "user_id": user_id, "book_id": book_id })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = app();

    let id = register(&app, "alice", "pw1").await;
    assert_eq!(id.len(), 24);

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        Some(json!({ "username": "alice", "password": "pw2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Kullanıcı adı zaten mevcut" }));
}

#[tokio::test]
async fn test_invalid_json() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Geçersiz JSON");

    // Wrong field type
    let (status, body) = send(&app, Method::POST, "/book", Some(json!({ "title": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Geçersiz JSON");
}

#[tokio::test]
async fn test_login() {
    let app = app();
    let id = register(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({ "username": "alice", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Giriş başarılı");
    assert_eq!(body["user_id"], id);

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Hatalı şifre");

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({ "username": "bob", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Kullanıcı bulunamadı");
}

#[tokio::test]
async fn test_get_and_delete_user() {
    let app = app();
    let id = register(&app, "alice", "pw1").await;

    let (status, body) = send(&app, Method::GET, &format!("/user/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "username": "alice", "books": [] }));

    let (status, body) = send(&app, Method::GET, "/user/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Geçersiz kullanıcı ID");

    let (status, body) = send(&app, Method::DELETE, &format!("/user/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Kullanıcı silindi");

    let (status, _) = send(&app, Method::GET, &format!("/user/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/user/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_books() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let dune = add_book(&app, "Dune").await;
    let user = register(&app, "alice", "pw1").await;
    add_book(&app, "Solaris").await;
    borrow(&app, &user, &dune).await;

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0], json!({ "id": dune, "title": "Dune", "borrower_id": user }));
    assert_eq!(books[1]["title"], "Solaris");
    assert!(books[1].get("borrower_id").is_none());
}

#[tokio::test]
async fn test_book_lent_once() {
    let app = app();
    let u = register(&app, "alice", "pw1").await;
    let u2 = register(&app, "bob", "pw2").await;
    let b = add_book(&app, "Dune").await;

    let (status, body) = borrow(&app, &u, &b).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Kitap başarıyla ödünç alındı");

    let (status, body) = borrow(&app, &u2, &b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Kitap zaten ödünç alınmış");
}

#[tokio::test]
async fn test_lending_limit() {
    let app = app();
    let u = register(&app, "alice", "pw1").await;
    let b1 = add_book(&app, "B1").await;
    let b2 = add_book(&app, "B2").await;
    let b3 = add_book(&app, "B3").await;

    assert_eq!(borrow(&app, &u, &b1).await.0, StatusCode::OK);
    assert_eq!(borrow(&app, &u, &b2).await.0, StatusCode::OK);

    let (status, body) = borrow(&app, &u, &b3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Kullanıcının 2 kitap limiti doldu");

    let (_, user) = send(&app, Method::GET, &format!("/user/{}", u), None).await;
    assert_eq!(user["books"], json!([b1, b2]));
}

#[tokio::test]
async fn test_borrow_errors() {
    let app = app();
    let u = register(&app, "alice", "pw1").await;
    let b = add_book(&app, "Dune").await;
    let missing = "65a1b2c3d4e5f60718293a4b";

    let (status, body) = borrow(&app, "bad", &b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Geçersiz user_id");

    let (status, body) = borrow(&app, &u, "bad").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Geçersiz book_id");

    let (status, body) = borrow(&app, missing, &b).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Kullanıcı bulunamadı");

    let (status, body) = borrow(&app, &u, missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Kitap bulunamadı");
}

#[tokio::test]
async fn test_return_requires_holder() {
    let app = app();
    let u = register(&app, "alice", "pw1").await;
    let u2 = register(&app, "bob", "pw2").await;
    let b = add_book(&app, "Dune").await;

    // Available book
    let (status, body) = give_back(&app, &u, &b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bu kitap bu kullanıcıya ait değil");

    borrow(&app, &u, &b).await;
    let (status, _) = give_back(&app, &u2, &b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, user) = send(&app, Method::GET, &format!("/user/{}", u), None).await;
    assert_eq!(user["books"], json!([b]));
}

#[tokio::test]
async fn test_borrow_return_round_trip() {
    let app = app();
    let u = register(&app, "alice", "pw1").await;
    let b = add_book(&app, "Dune").await;

    let (_, before) = send(&app, Method::GET, "/books", None).await;

    borrow(&app, &u, &b).await;
    let (status, body) = give_back(&app, &u, &b).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Kitap başarıyla iade edildi");

    let (_, after) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(before, after);
    let (_, user) = send(&app, Method::GET, &format!("/user/{}", u), None).await;
    assert_eq!(user["books"], json!([]));
}

#[tokio::test]
async fn test_deleting_holder_frees_books() {
    let app = app();
    let u = register(&app, "alice", "pw1").await;
    let u2 = register(&app, "bob", "pw2").await;
    let b = add_book(&app, "Dune").await;

    borrow(&app, &u, &b).await;
    send(&app, Method::DELETE, &format!("/user/{}", u), None).await;

    assert_eq!(borrow(&app, &u2, &b).await.0, StatusCode::OK);
}

const BASE_URL: &str = "http://localhost:3000";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn live_health_check() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn live_borrow_and_return() {
    let client = reqwest::Client::new();
    let username = format!("live-{}", std::process::id());

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({ "username": username, "password": "pw" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status(), 201);
    let user: Value = response.json().await.unwrap();
    let user_id = user["inserted_id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/book", BASE_URL))
        .json(&json!({ "title": "Dune" }))
        .send()
        .await
        .expect("Failed to add book");
    let book: Value = response.json().await.unwrap();
    let book_id = book["inserted_id"].as_str().unwrap().to_string();

    for path in ["borrow", "return"] {
        let response = client
            .post(format!("{}/{}", BASE_URL, path))
            .json(&json!({ "user_id": user_id, "book_id": book_id }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
    }

    let response = client
        .delete(format!("{}/user/{}", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to delete user");
    assert_eq!(response.status(), 200);
}
