//! Admin API endpoints
//!
//! Back-office routes. Everything except login requires an `Authorization`
//! header; the backend decides whether the credential is valid.
//!
//! - POST /api/admin/login
//! - GET /api/admin/me
//! - GET /api/admin/dashboard
//! - /api/admin/articles, /api/admin/categories, /api/admin/users: list/create + item update/delete
//! - /api/admin/comments: list + moderate/delete
//! - /api/admin/contacts: list + delete

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::api::middleware::{require_authorization, AppState};
use crate::api::proxy::forward;

/// Routes reachable without credentials
pub fn public_router() -> Router<AppState> {
    Router::new().route("/login", post(forward))
}

/// Routes that require an `Authorization` header
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(forward))
        .route("/dashboard", get(forward))
        // Articles
        .route("/articles", get(forward).post(forward))
        .route("/articles/{id}", get(forward).put(forward).delete(forward))
        // Categories
        .route("/categories", get(forward).post(forward))
        .route("/categories/{id}", put(forward).delete(forward))
        // Comment moderation
        .route("/comments", get(forward))
        .route("/comments/{id}", delete(forward).patch(forward))
        // Contact messages
        .route("/contacts", get(forward))
        .route("/contacts/{id}", delete(forward))
        // Back-office users
        .route("/users", get(forward).post(forward))
        .route("/users/{id}", put(forward).delete(forward))
        .route_layer(axum_middleware::from_fn(require_authorization))
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    public_router().merge(protected_router())
}
