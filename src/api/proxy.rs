//! Backend proxy handlers
//!
//! Every `/api/...` route forwards its method, query string, body and
//! `Authorization` header to the same path below the backend base URL, then
//! relays the backend's status and JSON body inside the response envelope.
//!
//! - 2xx: the body is relayed, wrapped in an envelope when it is not one already
//! - non-2xx: `{success: false, error: <backend message>}` with the backend status
//! - transport failure or malformed JSON: 500 "Internal server error."

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::middleware::{cache_control_shared, set_cache_control, ApiError, AppState};
use crate::api::responses::normalize_success;
use crate::services::{error_message, BackendResponse, ForwardRequest};

/// Prefix the gateway serves its API under
const API_PREFIX: &str = "/api";

/// How a successful response is post-processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relay {
    /// Relay as-is
    Plain,
    /// Add shared Cache-Control headers
    Cached,
}

/// Backend path for a gateway path: `/api/articles/x` → `/articles/x`
pub fn backend_path(path: &str) -> &str {
    match path.strip_prefix(API_PREFIX) {
        Some(rest) if rest.is_empty() => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Forward the request and relay the response
pub async fn forward(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    relay(&state, method, &uri, &headers, body, Relay::Plain).await
}

/// Forward a request whose successful response shared caches may keep
pub async fn forward_cached(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    relay(&state, method, &uri, &headers, body, Relay::Cached).await
}

async fn relay(
    state: &AppState,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
    mode: Relay,
) -> Result<Response, ApiError> {
    let request = ForwardRequest::new(method.clone(), backend_path(uri.path()))
        .with_query(uri.query())
        .with_headers(headers)
        .with_body(body);

    let response = state.backend.forward(request).await.map_err(|e| {
        tracing::error!(%method, path = %uri.path(), "Proxy request failed: {}", e);
        ApiError::internal_error()
    })?;

    let BackendResponse { status, body } = response;
    if !status.is_success() {
        let message = error_message(status, body.as_ref());
        tracing::debug!(%method, path = %uri.path(), %status, "Backend rejected request: {}", message);
        return Err(ApiError::from_backend(status, message));
    }

    let envelope = normalize_success(body);

    // 204 cannot carry the envelope
    let status = if status == StatusCode::NO_CONTENT { StatusCode::OK } else { status };
    let mut response = (status, Json(envelope)).into_response();

    if mode == Relay::Cached {
        let cache = &state.cache;
        set_cache_control(
            &mut response,
            &cache_control_shared(cache.categories_max_age, Some(cache.stale_while_revalidate)),
        );
    }

    Ok(response)
}
