//! API integration tests over the in-memory backend

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use catalog_server::{
    api,
    repository::Repository,
    services::{audit::MemoryAuditLog, cache::MemoryCache, Services},
    AppConfig, AppState,
};

/// Router over fresh in-memory stores, plus a handle on its audit log
fn app() -> (Router, Arc<MemoryAuditLog>) {
    let audit = Arc::new(MemoryAuditLog::new());
    let services = Services::new(
        Repository::in_memory(),
        Arc::new(MemoryCache::new()),
        audit.clone(),
        Duration::from_secs(60),
    );
    let state = AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(services),
    };
    (api::router(state), audit)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    actor: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-actor", actor);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    // Extractor rejections from axum itself come back as plain text
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn book(isbn: &str) -> Value {
    json!({
        "title": "Pedro Páramo",
        "isbn": isbn,
        "stock": 5,
        "price": 10.0
    })
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_book_lifecycle() {
    let (app, audit) = app();

    let (status, created) = send(&app, "POST", "/api/v1/books", Some(book("978-1")), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["is_active"], true);
    let id = created["id"].as_str().expect("No book ID").to_string();

    let (status, listed) = send(&app, "GET", "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, fetched) = send(&app, "GET", &format!("/api/v1/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["isbn"], "978-1");

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/v1/books/{}", id),
        Some(json!({ "stock": 2 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], 2);
    assert_eq!(updated["title"], "Pedro Páramo");

    let (status, removed) =
        send(&app, "DELETE", &format!("/api/v1/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], id.as_str());

    let (status, _) = send(&app, "GET", &format!("/api/v1/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchRecord");

    let (_, listed) = send(&app, "GET", "/api/v1/books", None, None).await;
    assert_eq!(listed, json!([]));

    let actions: Vec<String> = audit.entries().await.into_iter().map(|e| e.action).collect();
    assert_eq!(actions, vec!["CREATE_BOOK", "UPDATE_BOOK", "DELETE_BOOK"]);
}

#[tokio::test]
async fn test_duplicate_isbn_is_conflict() {
    let (app, audit) = app();

    let (status, _) = send(&app, "POST", "/api/v1/books", Some(book("978-2")), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/v1/books", Some(book("978-2")), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");
    assert_eq!(body["message"], "A book with this ISBN already exists");

    assert_eq!(audit.entries_for("CREATE_BOOK").await.len(), 1);
}

#[tokio::test]
async fn test_validation_errors() {
    let (app, audit) = app();

    let mut short_title = book("978-3");
    short_title["title"] = json!("ab");
    let (status, body) = send(&app, "POST", "/api/v1/books", Some(short_title), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    for price in [json!(0), json!(1_000_000_000_000u64), json!(10.005)] {
        let mut priced = book("978-3");
        priced["price"] = price;
        let (status, body) = send(&app, "POST", "/api/v1/books", Some(priced), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BadValue");
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/members",
        Some(json!({ "name": "Juan Rulfo", "email": "not-an-email" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/v1/books/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(audit.entries().await.is_empty());
}

#[tokio::test]
async fn test_actor_header() {
    let (app, audit) = app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/authors",
        Some(json!({ "name": "Juan Rulfo", "nationality": "Mexican" })),
        Some("librarian"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("No author ID").to_string();

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/authors/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let entries = audit.entries().await;
    assert_eq!(entries[0].action, "CREATE_AUTHOR");
    assert_eq!(entries[0].actor, "librarian");
    assert_eq!(entries[1].action, "DELETE_AUTHOR");
    assert_eq!(entries[1].actor, "system");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/authors",
        Some(json!({ "name": "Elena Garro", "nationality": "Mexican" })),
        Some("   "),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_member_number_is_server_assigned() {
    let (app, _) = app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/members",
        Some(json!({
            "name": "Rosario Castellanos",
            "email": "rosario@example.org",
            "member_number": "MEM-HACKED00"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let number = created["member_number"].as_str().expect("No member number");
    assert!(number.starts_with("MEM-"));
    assert_ne!(number, "MEM-HACKED00");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/members",
        Some(json!({ "name": "Someone Else", "email": "rosario@example.org" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "This email is already registered");
}

#[tokio::test]
async fn test_category_and_publisher_collections() {
    let (app, audit) = app();

    let (status, category) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(json!({ "name": "Novel", "description": "Long-form fiction" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().expect("No category ID").to_string();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/v1/categories/{}", category_id),
        Some(json!({ "description": "Fiction" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Novel");
    assert_eq!(updated["description"], "Fiction");

    let (status, cleared) = send(
        &app,
        "PATCH",
        &format!("/api/v1/categories/{}", category_id),
        Some(json!({ "description": null })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["name"], "Novel");
    assert_eq!(cleared["description"], Value::Null);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/publishers",
        Some(json!({
            "name": "Fondo de Cultura Económica",
            "website": "https://www.fondodeculturaeconomica.com"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/publishers",
        Some(json!({ "name": "Bad Site", "website": "not a url" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, publishers) = send(&app, "GET", "/api/v1/publishers", None, None).await;
    assert_eq!(publishers.as_array().map(Vec::len), Some(1));

    let update = audit.entries_for("UPDATE_CATEGORY").await;
    assert_eq!(update.len(), 2);
    assert_eq!(update[0].details["previous"]["description"], "Long-form fiction");
    assert_eq!(update[0].details["changes"], json!({ "description": "Fiction" }));
    assert_eq!(update[1].details["previous"]["description"], "Fiction");
    assert_eq!(update[1].details["changes"], json!({ "description": null }));
    assert_eq!(audit.entries_for("CREATE_PUBLISHER").await.len(), 1);
}
