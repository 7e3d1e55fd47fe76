//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints of the Newsdesk gateway:
//! - Public article, category, comment and contact proxies
//! - Admin proxies (Authorization header required)
//! - Sitemap, robots.txt and health endpoints

pub mod admin;
pub mod articles;
pub mod categories;
pub mod comments;
pub mod contact;
pub mod middleware;
pub mod proxy;
pub mod responses;
pub mod site;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{
    cache_control_document, cache_control_shared, require_authorization, ApiError, AppState,
    INTERNAL_ERROR_MESSAGE,
};
pub use responses::{ErrorEnvelope, SuccessEnvelope};

/// Build the `/api` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/articles", articles::router())
        .nest("/categories", categories::router())
        .nest("/comments", comments::router())
        .nest("/contact", contact::router())
        .nest("/admin", admin::router())
        .route("/health", get(site::health))
        .fallback(api_not_found)
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', cross-origin requests disabled", cors_origin);
            cors
        }
    };

    Router::new()
        .nest("/api", build_api_router())
        .merge(site::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
