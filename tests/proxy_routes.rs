use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::util::ServiceExt as _;

mod support;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(support::empty()).unwrap()
}

/// Admin routes without an Authorization header never reach the backend
#[tokio::test]
async fn e2e_admin_route_without_authorization_returns_401() {
    let app = support::gateway_for(support::closed_addr().await);

    let resp = app.oneshot(get("/api/admin/me")).await.unwrap();
    support::assert_error_response(resp, StatusCode::UNAUTHORIZED, "Authorization header missing").await;
}

#[tokio::test]
async fn e2e_admin_login_is_public() {
    let app = support::make_gateway().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"email": "editor@example.com", "password": "secret"}).to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert_eq!(body["data"]["token"], support::TOKEN);
}

#[tokio::test]
async fn e2e_admin_authorization_is_forwarded() {
    let app = support::make_gateway().await;

    let req = Request::builder()
        .uri("/api/admin/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", support::TOKEN))
        .body(support::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert_eq!(body["data"]["admin"]["email"], "editor@example.com");
}

#[tokio::test]
async fn e2e_backend_rejection_keeps_status_and_message() {
    let app = support::make_gateway().await;

    let req = Request::builder()
        .uri("/api/admin/me")
        .header(header::AUTHORIZATION, "Bearer stale")
        .body(support::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    support::assert_error_response(resp, StatusCode::UNAUTHORIZED, "Token expired").await;
}

#[tokio::test]
async fn e2e_backend_404_message_is_relayed() {
    let app = support::make_gateway().await;

    let resp = app.oneshot(get("/api/articles/missing")).await.unwrap();
    support::assert_error_response(resp, StatusCode::NOT_FOUND, "Article not found").await;
}

#[tokio::test]
async fn e2e_envelope_from_backend_is_relayed_unchanged() {
    let app = support::make_gateway().await;

    let resp = app.oneshot(get("/api/articles/hello-world")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert_eq!(body, json!({"success": true, "data": {"slug": "hello-world"}}));
}

#[tokio::test]
async fn e2e_query_string_is_forwarded() {
    let app = support::make_gateway().await;

    let resp = app.oneshot(get("/api/articles/search?q=rust&page=2")).await.unwrap();
    let body = support::body_json(resp).await;
    assert_eq!(body["data"]["query"], "q=rust&page=2");
}

#[tokio::test]
async fn e2e_plain_body_is_wrapped_and_status_kept() {
    let app = support::make_gateway().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"name": "Reader", "message": "Hi"}).to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = support::body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["received"]["name"], "Reader");
}

#[tokio::test]
async fn e2e_no_content_becomes_success_envelope() {
    let app = support::make_gateway().await;

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/api/admin/comments/c1")
        .header(header::AUTHORIZATION, format!("Bearer {}", support::TOKEN))
        .body(support::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(support::body_json(resp).await, json!({"success": true}));
}

#[tokio::test]
async fn e2e_unreachable_backend_returns_500() {
    let app = support::gateway_for(support::closed_addr().await);

    let resp = app.oneshot(get("/api/articles/anything")).await.unwrap();
    support::assert_error_response(resp, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").await;
}

#[tokio::test]
async fn e2e_malformed_backend_body_returns_500() {
    let app = support::make_gateway().await;

    let resp = app.oneshot(get("/api/articles/broken")).await.unwrap();
    support::assert_error_response(resp, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").await;
}

#[tokio::test]
async fn e2e_categories_carry_shared_cache_headers() {
    let app = support::make_gateway().await;

    let resp = app.oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, s-maxage=3600, stale-while-revalidate=86400"
    );
    let body = support::body_json(resp).await;
    assert_eq!(body["data"][0]["slug"], "world");
}

#[tokio::test]
async fn e2e_article_list_paged_by_backend_is_relayed_unchanged() {
    let app = support::make_gateway().await;

    let resp = app.clone().oneshot(get("/api/articles?page=2&limit=10")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    let docs = body["data"].as_array().unwrap();
    assert_eq!(docs.len(), 10);
    assert_eq!(docs[0]["_id"], "a11");
    assert_eq!(docs[9]["_id"], "a20");

    let resp = app.oneshot(get("/api/articles")).await.unwrap();
    let body = support::body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn e2e_paginated_object_is_relayed_unchanged() {
    let app = support::make_gateway().await;

    let resp = app.oneshot(get("/api/comments?article=a1&page=2")).await.unwrap();
    let body = support::body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["totalDocs"], 11);
    assert_eq!(body["data"]["pagingCounter"], 11);
    assert_eq!(body["data"]["docs"][0]["_id"], "c1");
}

#[tokio::test]
async fn e2e_extreme_page_is_forwarded_without_panicking() {
    let app = support::make_gateway().await;

    let resp = app
        .oneshot(get("/api/articles?page=18446744073709551615&limit=10"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn e2e_unknown_api_route_returns_404_envelope() {
    let app = support::gateway_for(support::closed_addr().await);

    let resp = app.oneshot(get("/api/nope")).await.unwrap();
    support::assert_error_response(resp, StatusCode::NOT_FOUND, "Not found").await;
}

#[tokio::test]
async fn e2e_health() {
    let app = support::gateway_for(support::closed_addr().await);

    let resp = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn e2e_sitemap_lists_categories_and_articles() {
    let app = support::make_gateway().await;

    let resp = app.oneshot(get("/sitemap.xml")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("application/xml"));
    let xml = support::body_text(resp).await;
    assert!(xml.contains("<loc>https://news.example.com/</loc>"));
    assert!(xml.contains("<loc>https://news.example.com/category/world</loc>"));
    assert!(xml.contains("<loc>https://news.example.com/news/article-7</loc>"));
    assert!(xml.contains("<lastmod>2024-05-01T10:00:00Z</lastmod>"));
}

#[tokio::test]
async fn e2e_sitemap_degrades_without_backend() {
    let app = support::gateway_for(support::closed_addr().await);

    let resp = app.oneshot(get("/sitemap.xml")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let xml = support::body_text(resp).await;
    assert!(xml.contains("<loc>https://news.example.com/about</loc>"));
    assert!(!xml.contains("/news/"));
}

#[tokio::test]
async fn e2e_robots_points_at_sitemap() {
    let app = support::gateway_for(support::closed_addr().await);

    let resp = app.oneshot(get("/robots.txt")).await.unwrap();
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "public, max-age=3600");
    let text = support::body_text(resp).await;
    assert!(text.contains("Sitemap: https://news.example.com/sitemap.xml"));
}
