//! Contact form endpoint
//!
//! - POST /api/contact - Send a message to the newsroom

use axum::{routing::post, Router};

use crate::api::middleware::AppState;
use crate::api::proxy::forward;

/// Build the contact router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(forward))
}
