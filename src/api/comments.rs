//! Public comment endpoints
//!
//! - GET /api/comments - Comments for an article (`?article=<id>`)
//! - POST /api/comments - Submit a comment for moderation

use axum::{routing::get, Router};

use crate::api::middleware::AppState;
use crate::api::proxy::forward;

/// Build the comments router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(forward).post(forward))
}
