#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, RawQuery},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use newsdesk::api::{self, AppState};
use newsdesk::config::CacheConfig;
use newsdesk::services::{BackendClient, SitemapBuilder};

pub const SITE_URL: &str = "https://news.example.com";
pub const TOKEN: &str = "token-123";

pub fn article(i: usize) -> Value {
    json!({
        "_id": format!("a{}", i),
        "title": format!("Article {}", i),
        "slug": format!("article-{}", i),
        "status": "published",
        "updatedAt": "2024-05-01T10:00:00Z"
    })
}

fn admin() -> Value {
    json!({"_id": "u1", "name": "Editor One", "email": "editor@example.com", "role": "editor"})
}

/// Article list; windows the 25 articles itself when `page`/`limit` are given
async fn list_articles(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let all: Vec<Value> = (1..=25).map(article).collect();
    if !params.contains_key("page") && !params.contains_key("limit") {
        return Json(Value::Array(all));
    }
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1).max(1);
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let skip = (page - 1).saturating_mul(limit);
    Json(Value::Array(all.into_iter().skip(skip).take(limit).collect()))
}

/// Comment list paged by the backend
async fn list_comments() -> Json<Value> {
    Json(json!({
        "docs": [{"_id": "c1", "content": "First!"}],
        "totalDocs": 11, "limit": 10, "page": 2, "totalPages": 2,
        "hasNextPage": false, "hasPrevPage": true, "nextPage": null,
        "prevPage": 1, "pagingCounter": 11
    }))
}

async fn search(RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({"success": true, "data": {"query": query}}))
}

async fn article_by_slug(Path(slug): Path<String>) -> Response {
    if slug == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Article not found"}))).into_response();
    }
    if slug == "broken" {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    Json(json!({"success": true, "data": {"slug": slug}})).into_response()
}

async fn categories() -> Json<Value> {
    Json(json!([{"_id": "c1", "name": "World", "slug": "world"}]))
}

async fn contact(Json(body): Json<Value>) -> Response {
    (StatusCode::CREATED, Json(json!({"received": body}))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({"success": true, "data": {"token": TOKEN, "admin": admin()}})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"success": false, "error": "Invalid credentials"}))).into_response()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(&format!("Bearer {}", TOKEN)[..])
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token expired"}))).into_response();
    }
    Json(json!({"success": true, "data": {"admin": admin()}})).into_response()
}

async fn dashboard() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token expired"}))).into_response()
}

async fn delete_comment() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Backend double serving the routes the gateway forwards to
pub fn backend_router() -> Router {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/articles/search", get(search))
        .route("/articles/{slug}", get(article_by_slug))
        .route("/categories", get(categories))
        .route("/comments", get(list_comments))
        .route("/contact", post(contact))
        .route("/admin/login", post(login))
        .route("/admin/me", get(me))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/articles", get(list_articles))
        .route("/admin/comments/{id}", axum::routing::delete(delete_comment))
}

/// Serve `router` on an ephemeral local port
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An address nothing listens on
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn gateway_for(backend: SocketAddr) -> Router {
    let backend = BackendClient::new(format!("http://{}", backend), Duration::from_secs(5)).unwrap();
    let state = AppState::new(backend, SitemapBuilder::new(SITE_URL), CacheConfig::default());
    api::build_router(state, "http://localhost:3000")
}

/// Gateway router in front of a freshly started backend double
pub async fn make_gateway() -> Router {
    let backend = serve(backend_router()).await;
    gateway_for(backend)
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn assert_error_response(resp: Response, status: StatusCode, message: &str) {
    assert_eq!(resp.status(), status);
    let body = body_json(resp).await;
    assert_eq!(body, json!({"success": false, "error": message}));
}

pub fn empty() -> Body {
    Body::empty()
}
