//! Site metadata endpoints
//!
//! - GET /sitemap.xml - XML sitemap of the public site
//! - GET /robots.txt - Crawler rules
//! - GET /api/health - Liveness probe

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{cache_control_document, set_cache_control, AppState};
use crate::api::responses::SuccessEnvelope;

/// Sitemap and robots.txt freshness, in seconds
const DOCUMENT_MAX_AGE: u32 = 3600;

/// Health check payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Routes served at the site root
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
}

/// GET /sitemap.xml
async fn sitemap(State(state): State<AppState>) -> Response {
    let xml = state.sitemap.generate(&state.backend).await;
    let mut response = ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response();
    set_cache_control(&mut response, &cache_control_document(DOCUMENT_MAX_AGE));
    response
}

/// GET /robots.txt
async fn robots(State(state): State<AppState>) -> Response {
    let mut response = ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], state.sitemap.robots()).into_response();
    set_cache_control(&mut response, &cache_control_document(DOCUMENT_MAX_AGE));
    response
}

/// GET /api/health
pub async fn health() -> Json<SuccessEnvelope<HealthResponse>> {
    Json(SuccessEnvelope::new(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
