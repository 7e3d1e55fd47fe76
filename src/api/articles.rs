//! Public article endpoints
//!
//! - GET /api/articles - List articles
//! - GET /api/articles/search - Search articles for the header dropdown
//! - GET /api/articles/{slug} - Article detail

use axum::{routing::get, Router};

use crate::api::middleware::AppState;
use crate::api::proxy::forward;

/// Build the articles router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(forward))
        .route("/search", get(forward))
        .route("/{slug}", get(forward))
}
