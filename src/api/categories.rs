//! Public category endpoints
//!
//! - GET /api/categories - Category list, cacheable by shared caches
//! - GET /api/categories/{slug} - Category detail

use axum::{routing::get, Router};

use crate::api::middleware::AppState;
use crate::api::proxy::{forward, forward_cached};

/// Build the categories router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(forward_cached))
        .route("/{slug}", get(forward))
}
