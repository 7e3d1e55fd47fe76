//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The `ApiError` envelope type
//! - Authorization header presence check for admin routes
//! - Cache-Control header builders

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::responses::ErrorEnvelope;
use crate::config::CacheConfig;
use crate::services::{BackendClient, SitemapBuilder};

/// Message returned for every unexpected failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub sitemap: Arc<SitemapBuilder>,
    pub cache: Arc<CacheConfig>,
}

impl AppState {
    pub fn new(backend: BackendClient, sitemap: SitemapBuilder, cache: CacheConfig) -> Self {
        Self {
            backend,
            sitemap: Arc::new(sitemap),
            cache: Arc::new(cache),
        }
    }
}

/// HTTP error rendered as `{"success": false, "error": "..."}`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Generic 500; details go to the log, never to the client
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    /// Relay a failed backend response
    pub fn from_backend(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorEnvelope::new(self.message))).into_response()
    }
}

/// True when the request carries a non-empty `Authorization` header
fn has_authorization(request: &Request) -> bool {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| !v.trim().is_empty())
}

/// Reject admin requests that carry no `Authorization` header.
///
/// Only presence is checked; the backend validates the credential.
pub async fn require_authorization(request: Request, next: Next) -> Result<Response, ApiError> {
    if !has_authorization(&request) {
        tracing::debug!(path = %request.uri().path(), "Rejected request without Authorization header");
        return Err(ApiError::unauthorized("Authorization header missing"));
    }
    Ok(next.run(request).await)
}

// ============================================================================
// HTTP Cache Headers
// ============================================================================

/// Cache-Control for responses shared caches may keep
pub fn cache_control_shared(max_age: u32, stale_while_revalidate: Option<u32>) -> String {
    match stale_while_revalidate {
        Some(swr) => format!("public, s-maxage={}, stale-while-revalidate={}", max_age, swr),
        None => format!("public, s-maxage={}", max_age),
    }
}

/// Cache-Control for generated text documents (sitemap, robots.txt)
pub fn cache_control_document(max_age: u32) -> String {
    format!("public, max-age={}", max_age)
}

/// Set `Cache-Control` on a response, ignoring values that are not valid headers
pub fn set_cache_control(response: &mut Response, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
}


#[cfg(test)]
mod cache_header_property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn shared_cache_header(max_age in 0u32..=31536000u32, swr in prop::option::of(1u32..=86400u32)) {
            let header = cache_control_shared(max_age, swr);
            let expected = format!("s-maxage={}", max_age);
            prop_assert!(header.starts_with("public"));
            prop_assert!(header.contains(&expected));
            prop_assert_eq!(header.contains("stale-while-revalidate"), swr.is_some());
            prop_assert!(HeaderValue::from_str(&header).is_ok());
        }
    }
}
