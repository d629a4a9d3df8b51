use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bookstore_app::books::source::{BookSource, FetchFailure};
use bookstore_app::books::view::{BookListView, MountOutcome};
use bookstore_app::books::BooksModule;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use serde_json::{json, Value};
use tower::ServiceExt;

struct CannedCatalog(Value);

#[async_trait]
impl BookSource for CannedCatalog {
    fn describe(&self) -> &str {
        "canned"
    }

    async fn fetch(&self) -> Result<Vec<Value>, FetchFailure> {
        Ok(serde_json::from_value(self.0.clone()).expect("canned catalog is an array"))
    }
}

/// Router over a books module whose view has already finished loading.
async fn loaded_app(catalog: Value) -> Router {
    let view = Arc::new(BookListView::new(Arc::new(CannedCatalog(catalog))).unwrap());
    let outcome = view.mount().unwrap().await.unwrap();
    assert!(matches!(outcome, MountOutcome::Loaded { .. }));

    let mut registry = ModuleRegistry::new();
    registry.register(Arc::new(BooksModule::new(view)));
    bookstore_http::build_router(&registry, &Settings::default())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn page_lists_loaded_books() {
    let app = loaded_app(json!([
        {},
        {"id": 5, "title": "Dune", "author": "Frank Herbert", "isbn": "123", "price": 499},
        null
    ]))
    .await;

    let (status, content_type, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains("<h1>📚 Book List</h1>"));
    assert_eq!(body.matches("<tr data-key=").count(), 1);
    assert!(body.contains("<td>Dune</td>"));
    assert!(!body.contains("No books found."));
}

#[tokio::test]
async fn page_for_empty_catalog_shows_message() {
    let app = loaded_app(json!([{}, {}])).await;

    let (status, _, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<p>No books found.</p>"));
    assert!(!body.contains("<table"));
}

#[tokio::test]
async fn api_returns_sanitized_books() {
    let app = loaded_app(json!([{}, {"id": 1, "title": "T"}, null, {"id": 2}])).await;

    let (status, _, body) = get(app, "/api/books").await;

    assert_eq!(status, StatusCode::OK);
    let books: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(books, json!([{"id": 1, "title": "T"}, {"id": 2}]));
}

#[tokio::test]
async fn module_health_and_openapi_are_mounted() {
    let app = loaded_app(json!([])).await;

    let (status, _, body) = get(app.clone(), "/api/books/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "books module is healthy");

    let (status, _, body) = get(app, "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let spec: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(spec["paths"]["/"]["get"]["summary"], "Book list page");
    assert_eq!(spec["paths"]["/api/books"]["get"]["summary"], "List loaded books");
    assert!(spec["paths"]["/api/books/health"].is_object());
}

#[tokio::test]
async fn module_lifecycle_mounts_once_and_unmounts_on_stop() {
    let view = Arc::new(BookListView::new(Arc::new(CannedCatalog(json!([{"id": 1}])))).unwrap());
    let mut registry = ModuleRegistry::new();
    registry.register(Arc::new(BooksModule::new(view.clone())));

    let settings = Settings::default();
    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await.unwrap();
    registry.start_modules(&ctx).await.unwrap();

    // `start` already issued the one load for this view
    assert!(view.mount().is_none());

    registry.stop_modules().await.unwrap();
    assert!(!view.is_alive());
}
